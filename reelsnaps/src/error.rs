//! Erreurs du chargement de snaps

/// Erreurs pouvant survenir lors du chargement d'une image de snap
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// La requête HTTP a échoué (réseau, DNS, timeout)
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Le serveur a répondu avec un statut non-2xx
    #[error("unexpected status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Les octets reçus ne forment pas une image décodable
    #[error("failed to decode image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// Autres erreurs
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias de Result pour les opérations de chargement
pub type Result<T> = std::result::Result<T, LoadError>;
