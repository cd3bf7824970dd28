//! Contrat du header de story
//!
//! Le moteur est sans rendu : il décrit au header ce qu'il doit montrer
//! (propriétaire, âge du snap, barres de progression) et le header le
//! dessine comme il l'entend. Sans header attaché, la lecture se déroule à
//! l'identique, simplement muette.

/// Vue d'en-tête d'une story : propriétaire, étiquette d'âge du snap et
/// barres de progression.
///
/// Toutes les méthodes sont des ordres d'affichage : aucune ne remonte
/// d'état vers le moteur. Les implémentations doivent rester bon marché,
/// le lecteur les appelle depuis son fil de transitions.
pub trait StoryHeader: Send + Sync {
    /// Affiche le nom et l'avatar du propriétaire de la story
    fn set_owner(&self, name: &str, picture_url: &str);

    /// Met à jour l'étiquette d'âge du snap courant (« 2h », « hier »)
    fn set_last_updated_label(&self, text: &str);

    /// (Re)construit `count` barres de progression vides
    fn create_progress_bars(&self, count: usize);

    /// Rend la barre `index` pleine (snap déjà vu)
    fn fill_progress_bar(&self, index: usize);

    /// Efface la barre `index` (démontage du cycle d'affichage)
    fn clear_progress_bar(&self, index: usize);
}
