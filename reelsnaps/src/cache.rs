//! Cache mémoire des images de snaps
//!
//! Les images décodées sont coûteuses à reconstruire (réseau + décodage), et
//! le défilement d'une liste de stories recharge souvent les mêmes snaps. Ce
//! module garde les dernières images en mémoire, indexées par URL, avec une
//! éviction FIFO au-delà de la capacité configurée.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::SnapImage;

/// État interne du cache (protégé par RwLock)
struct CacheInner {
    /// Images décodées (url → image)
    images: HashMap<String, Arc<SnapImage>>,
    /// Ordre d'insertion, pour l'éviction FIFO
    order: VecDeque<String>,
}

/// Cache mémoire d'images décodées, indexé par URL
pub struct SnapCache {
    inner: RwLock<CacheInner>,
    max_entries: usize,
}

impl SnapCache {
    /// Crée un cache vide limité à `max_entries` images
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                images: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries,
        }
    }

    /// Retourne l'image en cache pour cette URL, si présente
    pub async fn get(&self, url: &str) -> Option<Arc<SnapImage>> {
        let inner = self.inner.read().await;
        inner.images.get(url).cloned()
    }

    /// Insère une image, en évinçant les plus anciennes au besoin
    pub async fn insert(&self, url: &str, image: Arc<SnapImage>) {
        let mut inner = self.inner.write().await;

        if inner.images.insert(url.to_string(), image).is_none() {
            inner.order.push_back(url.to_string());
        }

        // Appliquer la limite de taille (FIFO)
        while inner.order.len() > self.max_entries {
            if let Some(oldest) = inner.order.pop_front() {
                inner.images.remove(&oldest);
                tracing::debug!(url = %oldest, "evicting snap image from cache");
            }
        }
    }

    /// Nombre d'images en cache
    pub async fn len(&self) -> usize {
        self.inner.read().await.images.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.images.is_empty()
    }

    /// Vide complètement le cache
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.images.clear();
        inner.order.clear();
    }
}
