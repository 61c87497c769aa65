use crate::application::filter_store::FilterStore;
use crate::application::sync_controller::SyncController;
use crate::domain::entities::AppConfig;
use crate::domain::ports::NavigationAdapter;
use crate::domain::services::{FilterCodec, QueryString};
use std::rc::Rc;
use url::Url;

/// The filter engine of one mounted product-listing screen.
///
/// Mounting reads the filters from the current address; dropping the session
/// (or calling [`CatalogSession::unmount`]) stops all synchronization.
pub struct CatalogSession {
    store: Rc<FilterStore>,
    controller: Rc<SyncController>,
    listing_path: String,
}

impl CatalogSession {
    pub fn mount(navigation: Rc<dyn NavigationAdapter>, config: &AppConfig) -> Self {
        let initial = FilterCodec::decode(&QueryString::parse(&navigation.current_query()));
        tracing::info!(
            "Mounted catalog listing with {} active filters",
            initial.active_filter_count()
        );

        let store = Rc::new(FilterStore::new(initial));
        let controller = SyncController::attach(Rc::clone(&store), navigation, &config.sync);

        Self {
            store,
            controller,
            listing_path: config.listing_path.clone(),
        }
    }

    pub fn store(&self) -> &Rc<FilterStore> {
        &self.store
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// Link reproducing the current filters on the listing page under `base`.
    pub fn share_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(&self.listing_path)?;
        let query = FilterCodec::encode(&self.store.filters()).to_string();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url)
    }

    pub fn unmount(self) {
        tracing::info!("Unmounting catalog listing");
    }
}

impl Drop for CatalogSession {
    fn drop(&mut self) {
        self.controller.detach();
    }
}
