//! Chargement asynchrone des images de stories
//!
//! Ce crate fournit le contrat de chargement utilisé par le moteur de
//! lecture pour récupérer les images des snaps, ainsi que son implémentation
//! HTTP de production.
//!
//! ## Architecture
//!
//! - [`SnapLoader`] : trait async, une URL en entrée → une image décodée
//! - [`HttpSnapLoader`] : `reqwest` + décodage `image` hors de l'exécuteur
//! - [`SnapCache`] : cache mémoire des images décodées, éviction FIFO
//! - [`SnapImage`] : image décodée prête à afficher
//!
//! Le moteur de lecture ne dépend que du trait ; les tests lui substituent
//! des chargeurs scriptés.
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use reelsnaps::{HttpSnapLoader, SnapLoader};
//!
//! # tokio_test::block_on(async {
//! let loader = HttpSnapLoader::new().unwrap();
//! let image = loader.load("https://example.com/snap.jpg").await.unwrap();
//! println!("{}x{}", image.width(), image.height());
//! # });
//! ```

mod cache;
mod error;
mod loader;
mod snap_image;

pub use cache::SnapCache;
pub use error::{LoadError, Result};
pub use loader::{HttpSnapLoader, LoaderConfig, SnapLoader};
pub use snap_image::SnapImage;
