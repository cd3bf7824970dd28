//! Évènements émis par le lecteur vers son hôte

use reelmodel::StoryId;

/// Évènement de lecture, livré aux callbacks enregistrés via
/// [`StoryPlayer::register_callback`](crate::StoryPlayer::register_callback).
///
/// Le moteur ne décide jamais de la navigation entre stories : il signale,
/// l'hôte tranche (passer à la story suivante, fermer le visualiseur...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryEvent {
    /// Le dernier snap de la story est arrivé au bout de son minuteur
    PreviewCompleted { story_id: StoryId },
    /// L'utilisateur a demandé la fermeture du visualiseur depuis le header
    CloseRequested { story_id: StoryId },
}

impl StoryEvent {
    /// Story concernée par l'évènement
    pub fn story_id(&self) -> &StoryId {
        match self {
            StoryEvent::PreviewCompleted { story_id } => story_id,
            StoryEvent::CloseRequested { story_id } => story_id,
        }
    }
}
