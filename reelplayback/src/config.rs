//! Configuration du moteur de lecture

use std::time::Duration;

/// Réglages d'un [`StoryPlayer`](crate::StoryPlayer)
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Temps d'affichage d'un snap avant l'avance automatique
    pub snap_duration: Duration,
    /// Précharge l'image du snap suivant dès qu'un snap devient actif
    pub prefetch_next: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            snap_duration: Duration::from_secs(5),
            prefetch_next: false,
        }
    }
}

impl PlaybackConfig {
    /// Configuration par défaut (5 secondes par snap, pas de préchargement)
    pub fn new() -> Self {
        Self::default()
    }

    /// Change le temps d'affichage d'un snap
    pub fn with_snap_duration(mut self, duration: Duration) -> Self {
        self.snap_duration = duration;
        self
    }

    /// Active ou coupe le préchargement du snap suivant
    pub fn with_prefetch_next(mut self, prefetch: bool) -> Self {
        self.prefetch_next = prefetch;
        self
    }
}
