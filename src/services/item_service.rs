use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::access::{self, AccessDenied};
use crate::api::{ItemCreate, ItemUpdate};
use crate::database::models::{Item, ItemPatch, User};
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::filter::{Filter, Page};

use super::{ServiceError, ServiceResult};

const ITEM_NOT_FOUND: &str = "Item not found";
const NOT_ENOUGH_PERMISSIONS: AccessDenied = AccessDenied("Not enough permissions");

#[derive(Clone)]
pub struct ItemService {
    items: Repository<Item>,
}

impl ItemService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: Repository::new(store),
        }
    }

    /// Everything for administrators, otherwise only the principal's items.
    fn visible_to(principal: &User) -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new();
        if !principal.is_superuser {
            filter.eq("owner_id", principal.id)?;
        }
        Ok(filter)
    }

    /// Load an item the principal is allowed to touch.
    async fn load(&self, principal: &User, id: Uuid) -> ServiceResult<Item> {
        let item = self
            .items
            .select_id(id)
            .await?
            .ok_or(ServiceError::NotFound(ITEM_NOT_FOUND))?;
        if !access::can_read_item(principal, &item) {
            warn!("User {} denied access to item {}", principal.id, id);
            return Err(NOT_ENOUGH_PERMISSIONS.into());
        }
        Ok(item)
    }

    pub async fn list(&self, principal: &User, page: Page) -> ServiceResult<(Vec<Item>, u64)> {
        let visible = Self::visible_to(principal)?;
        let count = self.items.count(&visible).await?;

        let mut windowed = visible;
        windowed.page(page).map_err(DatabaseError::from)?;
        let items = self.items.select_any(&windowed).await?;
        debug!("Listed {} of {} item(s) for {}", items.len(), count, principal.id);
        Ok((items, count))
    }

    pub async fn get(&self, principal: &User, id: Uuid) -> ServiceResult<Item> {
        self.load(principal, id).await
    }

    pub async fn create(&self, principal: &User, input: ItemCreate) -> ServiceResult<Item> {
        let item = Item::new(input.title, input.description, principal.id);
        self.items.insert(&item).await?;
        debug!("Item {} created by {}", item.id, principal.id);
        Ok(item)
    }

    pub async fn update(
        &self,
        principal: &User,
        id: Uuid,
        input: ItemUpdate,
    ) -> ServiceResult<Item> {
        let item = self.load(principal, id).await?;
        self.items
            .update(item.id, &ItemPatch::from(input))
            .await?
            .ok_or(ServiceError::NotFound(ITEM_NOT_FOUND))
    }

    pub async fn delete(&self, principal: &User, id: Uuid) -> ServiceResult<()> {
        let item = self.load(principal, id).await?;
        if !self.items.delete(item.id).await? {
            return Err(ServiceError::NotFound(ITEM_NOT_FOUND));
        }
        debug!("Item {} deleted by {}", item.id, principal.id);
        Ok(())
    }
}
