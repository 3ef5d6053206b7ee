use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{BgaClient, BgaConfig};
use crate::{FileCache, GameCatalog, Remote, RemoteError, SessionFactory};

const GAME_LIST_KEY: &str = "game-list";

/// Opens [`BgaClient`] sessions sharing one game catalog.
///
/// The catalog is read through the file cache (when configured) on first
/// use and kept for the lifetime of the factory.
pub struct BgaSessionFactory {
    config: BgaConfig,
    cache: Option<FileCache>,
    catalog: OnceCell<Arc<GameCatalog>>,
}

impl BgaSessionFactory {
    pub fn new(config: BgaConfig, cache: Option<FileCache>) -> Self {
        Self {
            config,
            cache,
            catalog: OnceCell::new(),
        }
    }

    async fn catalog(&self) -> Result<Arc<GameCatalog>, RemoteError> {
        self.catalog
            .get_or_try_init(|| async {
                let catalog = match &self.cache {
                    Some(cache) => {
                        cache
                            .get_or_fetch(GAME_LIST_KEY, || {
                                BgaClient::fetch_game_catalog(&self.config)
                            })
                            .await?
                    }
                    None => BgaClient::fetch_game_catalog(&self.config).await?,
                };
                Ok(Arc::new(catalog))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl SessionFactory for BgaSessionFactory {
    async fn game_catalog(&self) -> Result<GameCatalog, RemoteError> {
        Ok(self.catalog().await?.as_ref().clone())
    }

    async fn open_session(&self) -> Result<Box<dyn Remote>, RemoteError> {
        let catalog = self.catalog().await?;
        let client = BgaClient::connect(&self.config, catalog, self.cache.clone()).await?;
        Ok(Box::new(client))
    }
}
