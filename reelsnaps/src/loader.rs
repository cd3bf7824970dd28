//! Chargement HTTP des images de snaps
//!
//! Le moteur de lecture ne dépend que du trait [`SnapLoader`] : une URL en
//! entrée, une image décodée en sortie. [`HttpSnapLoader`] est
//! l'implémentation de production : requête `reqwest`, vérification du
//! statut, décodage via `image` hors de l'exécuteur async, et insertion dans
//! un [`SnapCache`] partagé.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{LoadError, Result, SnapCache, SnapImage};

/// Configuration du chargeur HTTP
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Délai maximum pour une requête
    pub timeout: Duration,
    /// Nombre maximum d'images décodées gardées en mémoire
    pub max_cache_entries: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_cache_entries: 64,
        }
    }
}

/// Contrat de chargement d'une image de snap.
///
/// Le moteur appelle `load` au plus une fois par snap et par cycle
/// d'affichage; c'est l'implémentation qui décide de mutualiser les
/// résultats (cache, etc.).
#[async_trait]
pub trait SnapLoader: Send + Sync {
    /// Charge l'image à cette URL
    async fn load(&self, url: &str) -> Result<Arc<SnapImage>>;
}

/// Chargeur HTTP adossé à un cache mémoire
pub struct HttpSnapLoader {
    client: reqwest::Client,
    cache: Arc<SnapCache>,
}

impl HttpSnapLoader {
    /// Crée un chargeur avec la configuration par défaut
    pub fn new() -> Result<Self> {
        Self::with_config(LoaderConfig::default())
    }

    /// Crée un chargeur avec une configuration explicite
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout réseau et capacité du cache mémoire
    pub fn with_config(config: LoaderConfig) -> Result<Self> {
        // Créer le client HTTP
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            cache: Arc::new(SnapCache::new(config.max_cache_entries)),
        })
    }

    /// Cache mémoire partagé par ce chargeur
    pub fn cache(&self) -> &Arc<SnapCache> {
        &self.cache
    }
}

#[async_trait]
impl SnapLoader for HttpSnapLoader {
    async fn load(&self, url: &str) -> Result<Arc<SnapImage>> {
        // Le cache évite le réseau et le décodage
        if let Some(hit) = self.cache.get(url).await {
            tracing::debug!(url, "snap image served from cache");
            return Ok(hit);
        }

        // Lancer la requête
        let response = self.client.get(url).send().await.map_err(|source| {
            LoadError::Fetch {
                url: url.to_string(),
                source,
            }
        })?;

        // Vérifier le statut
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status,
            });
        }

        // Télécharger tout en mémoire
        let bytes = response.bytes().await.map_err(|source| LoadError::Fetch {
            url: url.to_string(),
            source,
        })?;

        // Décoder hors de l'exécuteur
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| anyhow::anyhow!("image decode task failed: {e}"))?
            .map_err(|source| LoadError::Decode {
                url: url.to_string(),
                source,
            })?;

        let snap_image = Arc::new(SnapImage::new(url, decoded));
        self.cache.insert(url, Arc::clone(&snap_image)).await;
        tracing::debug!(
            url,
            width = snap_image.width(),
            height = snap_image.height(),
            "snap image loaded"
        );

        Ok(snap_image)
    }
}
