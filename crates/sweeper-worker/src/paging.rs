//! Explicit page iterators over the registry's paginated listings.

use sweeper_core::error::AppError;
use sweeper_core::result::AppResult;
use sweeper_core::traits::{RegistryApi, ServiceCatalog};
use sweeper_core::types::{Instance, Service};

/// Instances requested per listing page.
pub const PAGE_SIZE: usize = 100;

/// Lazily walks the paginated instance listing for one service.
///
/// Each call to [`next_page`] fetches one page at an increasing offset until
/// the cumulative count reaches the server-reported total. The pager is
/// finite and not restartable mid-stream; a fresh pager starts at offset
/// zero.
///
/// [`next_page`]: InstancePager::next_page
pub struct InstancePager<'a> {
    api: &'a dyn RegistryApi,
    service: &'a str,
    namespace: &'a str,
    page_size: usize,
    offset: usize,
    done: bool,
}

impl<'a> InstancePager<'a> {
    /// Create a pager over the listing of `service` in `namespace`.
    pub fn new(api: &'a dyn RegistryApi, service: &'a str, namespace: &'a str) -> Self {
        Self::with_page_size(api, service, namespace, PAGE_SIZE)
    }

    /// Create a pager with an explicit page size.
    pub fn with_page_size(
        api: &'a dyn RegistryApi,
        service: &'a str,
        namespace: &'a str,
        page_size: usize,
    ) -> Self {
        Self {
            api,
            service,
            namespace,
            page_size,
            offset: 0,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> AppResult<Option<Vec<Instance>>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .api
            .list_instances(self.service, self.namespace, self.offset, self.page_size)
            .await?;

        let fetched = page.instances.len();
        self.offset += fetched;

        if fetched == 0 && self.offset < page.amount {
            // Server reports more instances but stopped returning them;
            // better to abort the tick than loop forever.
            return Err(AppError::external(format!(
                "Instance listing for service '{}' stalled at offset {} of {}",
                self.service, self.offset, page.amount
            )));
        }

        if self.offset >= page.amount {
            self.done = true;
        }

        if fetched == 0 {
            return Ok(None);
        }

        Ok(Some(page.instances))
    }
}

/// Lazily walks the paginated auto-created service listing.
///
/// Same contract as [`InstancePager`]: finite, not restartable mid-stream,
/// errors when the listing stalls short of the server-reported total.
pub struct ServicePager<'a> {
    catalog: &'a dyn ServiceCatalog,
    page_size: usize,
    offset: usize,
    done: bool,
}

impl<'a> ServicePager<'a> {
    /// Create a pager over the auto-created service listing.
    pub fn new(catalog: &'a dyn ServiceCatalog) -> Self {
        Self::with_page_size(catalog, PAGE_SIZE)
    }

    /// Create a pager with an explicit page size.
    pub fn with_page_size(catalog: &'a dyn ServiceCatalog, page_size: usize) -> Self {
        Self {
            catalog,
            page_size,
            offset: 0,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> AppResult<Option<Vec<Service>>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .catalog
            .list_auto_created(self.offset, self.page_size)
            .await?;

        let fetched = page.services.len();
        self.offset += fetched;

        if fetched == 0 && self.offset < page.amount {
            return Err(AppError::external(format!(
                "Service listing stalled at offset {} of {}",
                self.offset, page.amount
            )));
        }

        if self.offset >= page.amount {
            self.done = true;
        }

        if fetched == 0 {
            return Ok(None);
        }

        Ok(Some(page.services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use sweeper_core::types::{InstancePage, InstanceRef, ServicePage, ServiceRef};

    /// Serves a fixed instance list page by page, like the real listing API.
    #[derive(Debug)]
    struct PagedRegistry {
        instances: Vec<Instance>,
        /// When set, report this total but return empty pages past the real
        /// data, simulating a stalled listing.
        reported_total: Option<usize>,
        calls: Mutex<usize>,
    }

    impl PagedRegistry {
        fn with_instances(n: usize) -> Self {
            let instances = (0..n)
                .map(|i| Instance {
                    id: format!("ins-{i}"),
                    host: format!("10.0.{}.{}", i / 256, i % 256),
                    port: 8091,
                    metadata: Default::default(),
                })
                .collect();
            Self {
                instances,
                reported_total: None,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl RegistryApi for PagedRegistry {
        async fn list_instances(
            &self,
            _service: &str,
            _namespace: &str,
            offset: usize,
            limit: usize,
        ) -> AppResult<InstancePage> {
            *self.calls.lock().unwrap() += 1;
            let page: Vec<Instance> = self
                .instances
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            Ok(InstancePage {
                amount: self.reported_total.unwrap_or(self.instances.len()),
                size: page.len(),
                instances: page,
            })
        }

        async fn delete_instances(&self, _instances: &[InstanceRef]) -> AppResult<()> {
            unreachable!("pager never deletes")
        }
    }

    async fn drain(pager: &mut InstancePager<'_>) -> Vec<Instance> {
        let mut all = Vec::new();
        while let Some(page) = pager.next_page().await.expect("page") {
            all.extend(page);
        }
        all
    }

    #[tokio::test]
    async fn empty_listing_is_exhausted_immediately() {
        let registry = PagedRegistry::with_instances(0);
        let mut pager = InstancePager::new(&registry, "naming", "production");
        assert!(pager.next_page().await.expect("page").is_none());
        // Exhausted pagers stop calling the API.
        assert!(pager.next_page().await.expect("page").is_none());
        assert_eq!(*registry.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn merges_all_pages_without_duplicates_or_drops() {
        let registry = PagedRegistry::with_instances(250);
        let mut pager = InstancePager::with_page_size(&registry, "naming", "production", 100);
        let all = drain(&mut pager).await;

        assert_eq!(all.len(), 250);
        let unique: HashSet<_> = all.iter().map(|i| i.id.clone()).collect();
        assert_eq!(unique.len(), 250);
        assert_eq!(*registry.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn total_equal_to_page_size_needs_one_call() {
        let registry = PagedRegistry::with_instances(100);
        let mut pager = InstancePager::with_page_size(&registry, "naming", "production", 100);
        let all = drain(&mut pager).await;
        assert_eq!(all.len(), 100);
        assert_eq!(*registry.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn odd_page_sizes_still_complete() {
        let registry = PagedRegistry::with_instances(10);
        let mut pager = InstancePager::with_page_size(&registry, "naming", "production", 3);
        let all = drain(&mut pager).await;
        assert_eq!(all.len(), 10);
        assert_eq!(*registry.calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn stalled_listing_is_an_error() {
        let mut registry = PagedRegistry::with_instances(50);
        registry.reported_total = Some(80);
        let mut pager = InstancePager::with_page_size(&registry, "naming", "production", 50);

        assert!(pager.next_page().await.expect("first page").is_some());
        pager.next_page().await.expect_err("stall must error");
    }

    /// Serves a fixed service list page by page.
    #[derive(Debug)]
    struct PagedCatalog {
        services: Vec<Service>,
        calls: Mutex<usize>,
    }

    impl PagedCatalog {
        fn with_services(n: usize) -> Self {
            let services = (0..n)
                .map(|i| Service {
                    name: format!("svc-{i}"),
                    namespace: "production".to_string(),
                    total_instance_count: 0,
                    healthy_instance_count: 0,
                })
                .collect();
            Self {
                services,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ServiceCatalog for PagedCatalog {
        async fn list_auto_created(&self, offset: usize, limit: usize) -> AppResult<ServicePage> {
            *self.calls.lock().unwrap() += 1;
            let page: Vec<Service> = self
                .services
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            Ok(ServicePage {
                amount: self.services.len(),
                size: page.len(),
                services: page,
            })
        }

        async fn delete_services(&self, _services: &[ServiceRef]) -> AppResult<usize> {
            unreachable!("pager never deletes")
        }
    }

    #[tokio::test]
    async fn service_pager_merges_all_pages() {
        let catalog = PagedCatalog::with_services(250);
        let mut pager = ServicePager::with_page_size(&catalog, 100);

        let mut all = Vec::new();
        while let Some(page) = pager.next_page().await.expect("page") {
            all.extend(page);
        }

        assert_eq!(all.len(), 250);
        let unique: HashSet<_> = all.iter().map(|s| s.name.clone()).collect();
        assert_eq!(unique.len(), 250);
        assert_eq!(*catalog.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn service_pager_handles_empty_listing() {
        let catalog = PagedCatalog::with_services(0);
        let mut pager = ServicePager::new(&catalog);
        assert!(pager.next_page().await.expect("page").is_none());
        assert_eq!(*catalog.calls.lock().unwrap(), 1);
    }
}
