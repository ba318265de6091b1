use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemCreate, ItemUpdate};
use crate::repositories::ItemRepositoryTrait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for deposited items
pub struct ItemService {
    item_repo: Arc<dyn ItemRepositoryTrait>,
}

impl ItemService {
    pub fn new(item_repo: Arc<dyn ItemRepositoryTrait>) -> Self {
        Self { item_repo }
    }

    /// Deposit an item. The owner is not checked against the user table.
    pub async fn create_item(&self, req: ItemCreate) -> AppResult<Item> {
        req.validate().map_err(AppError::Validation)?;

        let item = self.item_repo.create(&Item::new(req)).await?;
        info!(
            "Item {} deposited by {}: {} {} ({})",
            item.item_id, item.owner_id, item.brand, item.subcategory, item.value
        );
        Ok(item)
    }

    pub async fn get_item(&self, item_id: Uuid) -> AppResult<Item> {
        self.item_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    pub async fn list_items_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<Item>> {
        Ok(self.item_repo.find_by_owner(owner_id).await?)
    }

    /// Patch owner and/or share of an item
    pub async fn update_item(&self, item_id: Uuid, update: ItemUpdate) -> AppResult<Item> {
        update.validate().map_err(AppError::Validation)?;

        let mut item = self.get_item(item_id).await?;
        update.apply_to(&mut item, chrono::Utc::now().naive_utc());

        let item = self.item_repo.update(&item).await?;
        info!(
            "Item {} updated: owner={}, share={}",
            item.item_id, item.owner_id, item.share_percentage
        );
        Ok(item)
    }

    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        if !self.item_repo.delete(item_id).await? {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        info!("Item {} deleted", item_id);
        Ok(())
    }
}
