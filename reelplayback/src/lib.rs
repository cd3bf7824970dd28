//! Moteur de lecture de stories éphémères
//!
//! Une story est une liste ordonnée de snaps (images minutées). Ce crate
//! fournit la machine à états qui pilote sa lecture dans une cellule de
//! visualisation : index courant, minuteurs de progression, pauses
//! (pression longue, défilement), avance automatique, reprise après
//! recyclage de la cellule et relance au retour au premier plan.
//!
//! ## Architecture
//!
//! - [`StoryPlayer`] : la machine à états par cellule, le chef d'orchestre
//! - [`ProgressTrack`] : un emplacement statut/minuteur/image par snap
//! - [`ProgressTimer`] : compte à rebours suspendable à tir unique
//! - [`ForegroundNotifier`] : diffusion du signal « retour au premier plan »
//! - [`StoryHeader`] : contrat d'affichage du header (barres, étiquettes)
//! - [`StoryEvent`] : évènements remontés à l'hôte (complétion, fermeture)
//!
//! Le moteur est sans rendu et sans réseau : les images arrivent par le
//! trait [`SnapLoader`] (crate `reelsnaps`), l'affichage repart par
//! [`StoryHeader`] et les callbacks d'évènements.
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reelmodel::{Snap, Story, StoryId, StoryOwner};
//! use reelplayback::{StoryEvent, StoryPlayer};
//! use reelsnaps::HttpSnapLoader;
//!
//! #[tokio::main]
//! async fn main() {
//!     let loader = Arc::new(HttpSnapLoader::new().unwrap());
//!     let player = StoryPlayer::new(loader);
//!     player.register_callback(|event| {
//!         if let StoryEvent::PreviewCompleted { story_id } = event {
//!             println!("story {story_id} terminée");
//!         }
//!     });
//!
//!     let story = Arc::new(Story::new(
//!         StoryId::new("story-1"),
//!         StoryOwner::new("ana", "https://example.com/ana.png"),
//!         vec![Snap::new("https://example.com/1.jpg", "2h")],
//!     ));
//!
//!     // La cellule entre à l'écran : la lecture part du point de reprise
//!     player.assign_story(Arc::clone(&story));
//!     player.will_display(story.last_played_snap_index());
//!
//!     // ... l'hôte relaie les gestes au fil de l'eau ...
//!     player.long_press_begin();
//!     player.long_press_end();
//!     player.did_end_display();
//! }
//! ```

mod config;
mod events;
mod header;
mod lifecycle;
mod player;
mod timer;
mod track;

pub use config::PlaybackConfig;
pub use events::StoryEvent;
pub use header::StoryHeader;
pub use lifecycle::ForegroundNotifier;
pub use player::{PlaybackState, StoryPlayer};
pub use timer::ProgressTimer;
pub use track::{ProgressTrack, SnapStatus};

// Le contrat de chargement vient de reelsnaps ; ré-exporté pour les hôtes
pub use reelsnaps::{SnapImage, SnapLoader};
