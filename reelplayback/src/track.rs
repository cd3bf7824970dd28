//! Piste de progression d'une story
//!
//! Une [`ProgressTrack`] maintient un emplacement par snap, le pendant
//! interne des barres de progression du header. Chaque emplacement porte
//! son statut ([`SnapStatus`]), le minuteur du snap actif et l'image
//! décodée une fois chargée.
//!
//! La piste ne décide de rien : c'est le lecteur qui ordonne les
//! transitions. Les index hors bornes sont des no-ops, journalisés en
//! debug.

use std::sync::Arc;
use std::time::Duration;

use reelsnaps::SnapImage;

use crate::timer::ProgressTimer;

/// Statut d'un emplacement de snap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapStatus {
    /// Rien demandé pour ce snap
    Pending,
    /// Chargement d'image en cours (ou échoué, sans retentative)
    Loading,
    /// Snap affiché, minuteur en route
    Active,
    /// Barre pleine, snap consommé pour ce cycle d'affichage
    Played,
}

/// Un emplacement par snap
struct SnapSlot {
    status: SnapStatus,
    timer: Option<ProgressTimer>,
    image: Option<Arc<SnapImage>>,
}

impl SnapSlot {
    fn new() -> Self {
        Self {
            status: SnapStatus::Pending,
            timer: None,
            image: None,
        }
    }
}

/// Piste de progression : un emplacement par snap de la story affichée
pub struct ProgressTrack {
    slots: Vec<SnapSlot>,
}

impl ProgressTrack {
    /// Crée une piste de `count` emplacements, tous [`SnapStatus::Pending`]
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| SnapSlot::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Statut de l'emplacement `index`, None hors bornes
    pub fn status(&self, index: usize) -> Option<SnapStatus> {
        self.slots.get(index).map(|slot| slot.status)
    }

    /// Image décodée de l'emplacement `index`, si déjà chargée
    pub fn image(&self, index: usize) -> Option<Arc<SnapImage>> {
        self.slots.get(index).and_then(|slot| slot.image.clone())
    }

    /// Marque `Played` tous les emplacements avant `up_to`.
    ///
    /// C'est la reprise en milieu de story : les barres des snaps déjà vus
    /// s'affichent pleines sans rejouer leurs minuteurs. Idempotent, et un
    /// `up_to` au-delà de la piste marque simplement tout.
    pub fn mark_played_up_to(&mut self, up_to: usize) {
        for slot in self.slots.iter_mut().take(up_to) {
            slot.timer = None;
            slot.status = SnapStatus::Played;
        }
    }

    /// Passe `Pending` → `Loading` et dit si la transition a eu lieu.
    ///
    /// Garde-fou « un seul chargement par snap et par cycle » : le lecteur
    /// ne sollicite le chargeur que si cette méthode retourne true.
    pub fn mark_loading(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.status == SnapStatus::Pending => {
                slot.status = SnapStatus::Loading;
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!(index, "mark_loading out of range");
                false
            }
        }
    }

    /// Range l'image décodée sur son emplacement
    pub fn store_image(&mut self, index: usize, image: Arc<SnapImage>) {
        match self.slots.get_mut(index) {
            Some(slot) => slot.image = Some(image),
            None => tracing::debug!(index, "store_image out of range"),
        }
    }

    /// Rend `index` actif et démarre son minuteur.
    ///
    /// Réactiver un index remplace son minuteur précédent (annulation
    /// implicite, cas du redémarrage à pleine durée). Activer un index
    /// pendant qu'un autre est actif est une erreur d'enchaînement : le
    /// lecteur doit d'abord avoir conclu le snap courant.
    pub fn activate<F>(&mut self, index: usize, duration: Duration, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        debug_assert!(
            self.slots
                .iter()
                .enumerate()
                .all(|(i, slot)| i == index || slot.status != SnapStatus::Active),
            "only one snap may be active at a time"
        );
        match self.slots.get_mut(index) {
            Some(slot) => {
                // Remplacer le minuteur existant l'annule (Drop)
                slot.timer = Some(ProgressTimer::start(duration, on_complete));
                slot.status = SnapStatus::Active;
            }
            None => tracing::debug!(index, "activate out of range"),
        }
    }

    /// Suspend le minuteur de `index` ; sans minuteur : no-op
    pub fn pause(&self, index: usize) {
        if let Some(timer) = self.slots.get(index).and_then(|slot| slot.timer.as_ref()) {
            timer.pause();
        }
    }

    /// Reprend le minuteur de `index` ; sans minuteur : no-op
    pub fn resume(&self, index: usize) {
        if let Some(timer) = self.slots.get(index).and_then(|slot| slot.timer.as_ref()) {
            timer.resume();
        }
    }

    /// Barre pleine : `index` passe `Played`, son minuteur est écarté
    pub fn complete(&mut self, index: usize) {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.timer = None;
                slot.status = SnapStatus::Played;
            }
            None => tracing::debug!(index, "complete out of range"),
        }
    }

    /// Réinitialise l'emplacement `index` : minuteur annulé, image jetée
    pub fn clear(&mut self, index: usize) {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.timer = None;
                slot.image = None;
                slot.status = SnapStatus::Pending;
            }
            None => tracing::debug!(index, "clear out of range"),
        }
    }

    /// Réinitialise tous les emplacements (démontage du cycle d'affichage)
    pub fn clear_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.timer = None;
            slot.image = None;
            slot.status = SnapStatus::Pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::advance;

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn test_image(url: &str) -> Arc<SnapImage> {
        Arc::new(SnapImage::new(url, DynamicImage::new_rgba8(1, 1)))
    }

    fn fire_counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&fired);
        (fired, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_new_track_all_pending() {
        let track = ProgressTrack::new(3);
        assert_eq!(track.len(), 3);
        assert!(!track.is_empty());
        for index in 0..3 {
            assert_eq!(track.status(index), Some(SnapStatus::Pending));
            assert!(track.image(index).is_none());
        }
        assert_eq!(track.status(3), None);
    }

    #[test]
    fn test_mark_played_up_to() {
        let mut track = ProgressTrack::new(4);
        track.mark_played_up_to(2);
        assert_eq!(track.status(0), Some(SnapStatus::Played));
        assert_eq!(track.status(1), Some(SnapStatus::Played));
        assert_eq!(track.status(2), Some(SnapStatus::Pending));

        // Idempotent, et borné par la longueur de la piste
        track.mark_played_up_to(2);
        track.mark_played_up_to(10);
        assert_eq!(track.status(3), Some(SnapStatus::Played));
    }

    #[test]
    fn test_mark_loading_happens_at_most_once() {
        let mut track = ProgressTrack::new(2);
        assert!(track.mark_loading(0));
        assert!(!track.mark_loading(0));
        assert_eq!(track.status(0), Some(SnapStatus::Loading));

        track.mark_played_up_to(1);
        assert!(!track.mark_loading(0));
        assert!(!track.mark_loading(5));
    }

    #[test]
    fn test_store_image_and_read_back() {
        let mut track = ProgressTrack::new(2);
        let image = test_image("https://example.com/0.jpg");
        track.store_image(0, Arc::clone(&image));
        assert!(Arc::ptr_eq(&track.image(0).unwrap(), &image));
        assert!(track.image(1).is_none());
    }

    #[test]
    fn test_out_of_range_operations_are_noops() {
        let mut track = ProgressTrack::new(2);
        track.store_image(7, test_image("https://example.com/x.jpg"));
        track.pause(7);
        track.resume(7);
        track.complete(7);
        track.clear(7);
        assert_eq!(track.status(0), Some(SnapStatus::Pending));
        assert_eq!(track.status(1), Some(SnapStatus::Pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_runs_timer_to_completion() {
        let mut track = ProgressTrack::new(2);
        let (fired, on_complete) = fire_counter();
        track.activate(0, Duration::from_secs(2), on_complete);
        assert_eq!(track.status(0), Some(SnapStatus::Active));

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reactivate_replaces_timer() {
        let mut track = ProgressTrack::new(1);
        let (first_fired, first) = fire_counter();
        track.activate(0, Duration::from_secs(5), first);

        advance(Duration::from_secs(2)).await;
        settle().await;
        let (second_fired, second) = fire_counter();
        track.activate(0, Duration::from_secs(5), second);

        // L'ancien minuteur aurait tiré à t=5 : il a été remplacé
        advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 0);

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_discards_timer() {
        let mut track = ProgressTrack::new(1);
        let (fired, on_complete) = fire_counter();
        track.activate(0, Duration::from_secs(5), on_complete);
        track.complete(0);
        assert_eq!(track.status(0), Some(SnapStatus::Played));

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_timer() {
        let mut track = ProgressTrack::new(1);
        let (fired, on_complete) = fire_counter();
        track.activate(0, Duration::from_secs(5), on_complete);
        track.store_image(0, test_image("https://example.com/0.jpg"));

        track.clear(0);
        assert_eq!(track.status(0), Some(SnapStatus::Pending));
        assert!(track.image(0).is_none());

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_resets_everything() {
        let mut track = ProgressTrack::new(3);
        track.mark_played_up_to(1);
        track.store_image(1, test_image("https://example.com/1.jpg"));
        let (fired, on_complete) = fire_counter();
        track.activate(2, Duration::from_secs(5), on_complete);

        track.clear_all();
        for index in 0..3 {
            assert_eq!(track.status(index), Some(SnapStatus::Pending));
            assert!(track.image(index).is_none());
        }

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_delegate_to_timer() {
        let mut track = ProgressTrack::new(1);
        let (fired, on_complete) = fire_counter();
        track.activate(0, Duration::from_secs(3), on_complete);

        advance(Duration::from_secs(1)).await;
        settle().await;
        track.pause(0);
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        track.resume(0);
        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pause_without_timer_is_noop() {
        let track = ProgressTrack::new(2);
        track.pause(0);
        track.resume(1);
        assert_eq!(track.status(0), Some(SnapStatus::Pending));
    }
}
