//! Typed access to the Uplink v1 resource hierarchy.

use {
    nibe_oauth::{AuthorizedClient, OAuthError, TokenPersister},
    serde::de::DeserializeOwned,
    tracing::debug,
};

use crate::types::{
    Category, CategoryTree, Parameter, SystemTree, SystemUnit, SystemsPage, UnitTree,
};

pub struct UplinkClient<P> {
    client: AuthorizedClient<P>,
    base_url: String,
}

impl<P: TokenPersister> UplinkClient<P> {
    pub fn new(client: AuthorizedClient<P>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// `GET /api/v1/systems`: systems assigned to the authorized user.
    pub async fn systems(&mut self) -> Result<SystemsPage, OAuthError> {
        self.fetch("/api/v1/systems", &[]).await
    }

    /// `GET /api/v1/systems?page=..&itemsPerPage=..`.
    pub async fn systems_page(
        &mut self,
        page: u32,
        items_per_page: u32,
    ) -> Result<SystemsPage, OAuthError> {
        let page = page.to_string();
        let items_per_page = items_per_page.to_string();
        self.fetch("/api/v1/systems", &[
            ("page", page.as_str()),
            ("itemsPerPage", items_per_page.as_str()),
        ])
        .await
    }

    /// Master and slave units connected to a system.
    pub async fn units(&mut self, system_id: i64) -> Result<Vec<SystemUnit>, OAuthError> {
        self.fetch(&format!("/api/v1/systems/{system_id}/units"), &[])
            .await
    }

    /// Parameter categories of one unit.
    pub async fn categories(
        &mut self,
        system_id: i64,
        system_unit_id: i64,
    ) -> Result<Vec<Category>, OAuthError> {
        let unit = system_unit_id.to_string();
        self.fetch(
            &format!("/api/v1/systems/{system_id}/serviceinfo/categories"),
            &[("systemUnitId", unit.as_str())],
        )
        .await
    }

    /// Parameters of one category on one unit.
    pub async fn parameters(
        &mut self,
        system_id: i64,
        category_id: &str,
        system_unit_id: i64,
    ) -> Result<Vec<Parameter>, OAuthError> {
        let unit = system_unit_id.to_string();
        self.fetch(
            &format!("/api/v1/systems/{system_id}/serviceinfo/categories/{category_id}"),
            &[("systemUnitId", unit.as_str())],
        )
        .await
    }

    /// Walk systems, units, categories and parameters in order.
    ///
    /// The first failing call aborts the whole walk.
    pub async fn parameter_tree(&mut self) -> Result<Vec<SystemTree>, OAuthError> {
        let page = self.systems().await?;
        let mut systems = Vec::with_capacity(page.objects.len());

        for system in page.objects {
            let mut units = Vec::new();
            for unit in self.units(system.system_id).await? {
                let mut categories = Vec::new();
                for category in self
                    .categories(system.system_id, unit.system_unit_id)
                    .await?
                {
                    let parameters = self
                        .parameters(
                            system.system_id,
                            &category.category_id,
                            unit.system_unit_id,
                        )
                        .await?;
                    categories.push(CategoryTree {
                        category,
                        parameters,
                    });
                }
                units.push(UnitTree { unit, categories });
            }
            systems.push(SystemTree { system, units });
        }
        Ok(systems)
    }

    async fn fetch<T: DeserializeOwned>(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, OAuthError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "uplink request");
        self.client.get_json(&url, query).await
    }
}
