//! 商品、店铺配置、文案区块与内容页存储。
//!
//! `CatalogStore` 是处理函数唯一依赖的存储能力；默认实现把整份快照保存在内存，
//! 每次写入先落盘（临时文件 + rename）再替换内存副本，落盘失败时内存保持原状。

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use boutique_protocol::{
    ContentPage, ContentSection, Product, SectionContent, ShopConfig, now_rfc3339_nanos,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// 存储层错误。
#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("read catalog file failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("write catalog file failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("decode catalog file failed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("encode catalog file failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("page slug already exists: {0}")]
    DuplicateSlug(String),
}

/// 商品局部更新。
#[derive(Debug, Default, Clone)]
pub(crate) struct ProductPatch {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) price: Option<f64>,
    pub(crate) video_url: Option<String>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) order_link: Option<String>,
    pub(crate) is_active: Option<bool>,
}

/// 内容页局部更新。
#[derive(Debug, Default, Clone)]
pub(crate) struct PagePatch {
    pub(crate) slug: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) is_published: Option<bool>,
}

/// 店面数据存储能力。
#[async_trait]
pub(crate) trait CatalogStore: Send + Sync {
    /// 商品列表，最新创建的在前。
    async fn list_products(&self, active_only: bool) -> Result<Vec<Product>, StoreError>;
    async fn get_product(
        &self,
        id: &str,
        active_only: bool,
    ) -> Result<Option<Product>, StoreError>;
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;
    /// 不存在时返回 `Ok(None)`。
    async fn update_product(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;
    /// 返回是否确实删除了记录。
    async fn delete_product(&self, id: &str) -> Result<bool, StoreError>;

    async fn shop_config(&self) -> Result<Option<ShopConfig>, StoreError>;
    async fn save_shop_config(&self, config: ShopConfig) -> Result<ShopConfig, StoreError>;

    async fn list_sections(&self) -> Result<Vec<ContentSection>, StoreError>;
    /// 按 `page_key` 新建或覆盖文案区块。
    async fn upsert_section(
        &self,
        page_key: &str,
        value: String,
    ) -> Result<ContentSection, StoreError>;

    async fn list_pages(&self) -> Result<Vec<ContentPage>, StoreError>;
    async fn insert_page(&self, page: ContentPage) -> Result<ContentPage, StoreError>;
    async fn update_page(
        &self,
        id: &str,
        patch: PagePatch,
    ) -> Result<Option<ContentPage>, StoreError>;
    async fn delete_page(&self, id: &str) -> Result<bool, StoreError>;
}

/// 数据文件内容。
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogSnapshot {
    version: u32,
    /// 按创建顺序追加。
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    shop_config: Option<ShopConfig>,
    #[serde(default)]
    sections: Vec<ContentSection>,
    #[serde(default)]
    pages: Vec<ContentPage>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            version: 1,
            products: Vec::new(),
            shop_config: None,
            sections: Vec::new(),
            pages: Vec::new(),
        }
    }
}

/// JSON 文件存储。
pub(crate) struct JsonCatalogStore {
    path: PathBuf,
    snapshot: RwLock<CatalogSnapshot>,
}

impl JsonCatalogStore {
    /// 打开数据文件；文件不存在时从空快照开始。
    pub(crate) async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let snapshot = load_snapshot(&path)?;
        Ok(Self {
            path,
            snapshot: RwLock::new(snapshot),
        })
    }

    /// 在快照副本上执行修改，落盘成功后再生效。
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut CatalogSnapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.snapshot.write().await;
        let mut next = guard.clone();
        let out = apply(&mut next)?;
        persist_snapshot(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn list_products(&self, active_only: bool) -> Result<Vec<Product>, StoreError> {
        let guard = self.snapshot.read().await;
        Ok(guard
            .products
            .iter()
            .rev()
            .filter(|product| !active_only || product.is_active)
            .cloned()
            .collect())
    }

    async fn get_product(
        &self,
        id: &str,
        active_only: bool,
    ) -> Result<Option<Product>, StoreError> {
        let guard = self.snapshot.read().await;
        Ok(guard
            .products
            .iter()
            .find(|product| product.id == id && (!active_only || product.is_active))
            .cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        self.mutate(|snapshot| {
            snapshot.products.push(product.clone());
            Ok(product)
        })
        .await
    }

    async fn update_product(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        self.mutate(|snapshot| {
            let Some(product) = snapshot.products.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            if let Some(name) = patch.name {
                product.name = name;
            }
            if let Some(description) = patch.description {
                product.description = description;
            }
            if let Some(price) = patch.price {
                product.price = price;
            }
            if let Some(video_url) = patch.video_url {
                product.video_url = video_url;
            }
            if let Some(thumbnail_url) = patch.thumbnail_url {
                product.thumbnail_url = thumbnail_url;
            }
            if let Some(order_link) = patch.order_link {
                product.order_link = order_link;
            }
            if let Some(is_active) = patch.is_active {
                product.is_active = is_active;
            }
            product.updated_at = now_rfc3339_nanos();
            Ok(Some(product.clone()))
        })
        .await
    }

    async fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(|snapshot| {
            let before = snapshot.products.len();
            snapshot.products.retain(|product| product.id != id);
            Ok(snapshot.products.len() != before)
        })
        .await
    }

    async fn shop_config(&self) -> Result<Option<ShopConfig>, StoreError> {
        Ok(self.snapshot.read().await.shop_config.clone())
    }

    async fn save_shop_config(&self, config: ShopConfig) -> Result<ShopConfig, StoreError> {
        self.mutate(|snapshot| {
            snapshot.shop_config = Some(config.clone());
            Ok(config)
        })
        .await
    }

    async fn list_sections(&self) -> Result<Vec<ContentSection>, StoreError> {
        Ok(self.snapshot.read().await.sections.clone())
    }

    async fn upsert_section(
        &self,
        page_key: &str,
        value: String,
    ) -> Result<ContentSection, StoreError> {
        self.mutate(|snapshot| {
            let section = ContentSection {
                page_key: page_key.to_string(),
                content: SectionContent { value },
                updated_at: now_rfc3339_nanos(),
            };
            match snapshot.sections.iter_mut().find(|s| s.page_key == page_key) {
                Some(existing) => *existing = section.clone(),
                None => snapshot.sections.push(section.clone()),
            }
            Ok(section)
        })
        .await
    }

    async fn list_pages(&self) -> Result<Vec<ContentPage>, StoreError> {
        Ok(self.snapshot.read().await.pages.clone())
    }

    async fn insert_page(&self, page: ContentPage) -> Result<ContentPage, StoreError> {
        self.mutate(|snapshot| {
            if snapshot.pages.iter().any(|p| p.slug == page.slug) {
                return Err(StoreError::DuplicateSlug(page.slug.clone()));
            }
            snapshot.pages.push(page.clone());
            Ok(page)
        })
        .await
    }

    async fn update_page(
        &self,
        id: &str,
        patch: PagePatch,
    ) -> Result<Option<ContentPage>, StoreError> {
        self.mutate(|snapshot| {
            if let Some(slug) = patch.slug.as_deref()
                && snapshot.pages.iter().any(|p| p.slug == slug && p.id != id)
            {
                return Err(StoreError::DuplicateSlug(slug.to_string()));
            }
            let Some(page) = snapshot.pages.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            if let Some(slug) = patch.slug {
                page.slug = slug;
            }
            if let Some(title) = patch.title {
                page.title = title;
            }
            if let Some(content) = patch.content {
                page.content = content;
            }
            if let Some(is_published) = patch.is_published {
                page.is_published = is_published;
            }
            page.updated_at = now_rfc3339_nanos();
            Ok(Some(page.clone()))
        })
        .await
    }

    async fn delete_page(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(|snapshot| {
            let before = snapshot.pages.len();
            snapshot.pages.retain(|page| page.id != id);
            Ok(snapshot.pages.len() != before)
        })
        .await
    }
}

/// 加载数据文件。
fn load_snapshot(path: &Path) -> Result<CatalogSnapshot, StoreError> {
    if !path.exists() {
        return Ok(CatalogSnapshot::default());
    }
    let raw = fs::read(path).map_err(StoreError::Read)?;
    serde_json::from_slice(&raw).map_err(StoreError::Decode)
}

/// 持久化数据文件：先写临时文件再 rename，避免留下半截文件。
fn persist_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(StoreError::Write)?;
    }
    let encoded = serde_json::to_vec_pretty(snapshot).map_err(StoreError::Encode)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, encoded).map_err(StoreError::Write)?;
    fs::rename(&tmp, path).map_err(StoreError::Write)
}

#[cfg(test)]
mod tests {
    use boutique_protocol::{ContentPage, Product, ShopConfig, now_rfc3339_nanos};

    use super::{CatalogStore, JsonCatalogStore, PagePatch, ProductPatch, StoreError};

    fn product(name: &str) -> Product {
        Product::create(
            name.to_string(),
            format!("{name} description"),
            19.9,
            "https://cdn/v.mp4".to_string(),
            "https://cdn/t.jpg".to_string(),
            "https://order".to_string(),
        )
    }

    fn page(slug: &str) -> ContentPage {
        let now = now_rfc3339_nanos();
        ContentPage {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            content: String::new(),
            is_published: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    async fn open_temp() -> (tempfile::TempDir, JsonCatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::open(dir.path().join("data").join("catalog.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn products_list_newest_first_and_filter_inactive() {
        let (_dir, store) = open_temp().await;
        let first = store.insert_product(product("first")).await.unwrap();
        let second = store.insert_product(product("second")).await.unwrap();
        store
            .update_product(
                &first.id,
                ProductPatch {
                    is_active: Some(false),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        let all = store.list_products(false).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["second", "first"]
        );
        let active = store.list_products(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);
        assert!(store.get_product(&first.id, true).await.unwrap().is_none());
        assert!(store.get_product(&first.id, false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let created = {
            let store = JsonCatalogStore::open(path.clone()).await.unwrap();
            store
                .save_shop_config(ShopConfig {
                    shop_name: "Chanvre & Co".to_string(),
                    ..ShopConfig::default()
                })
                .await
                .unwrap();
            store.insert_product(product("persisted")).await.unwrap()
        };

        let reopened = JsonCatalogStore::open(path).await.unwrap();
        let loaded = reopened.get_product(&created.id, false).await.unwrap();
        assert_eq!(loaded, Some(created));
        assert_eq!(
            reopened.shop_config().await.unwrap().unwrap().shop_name,
            "Chanvre & Co"
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let (_dir, store) = open_temp().await;
        let missing = store
            .update_product("nope", ProductPatch::default())
            .await
            .unwrap();
        assert!(missing.is_none());
        assert!(!store.delete_product("nope").await.unwrap());

        let created = store.insert_product(product("gone")).await.unwrap();
        assert!(store.delete_product(&created.id).await.unwrap());
        assert!(store.list_products(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_slugs_are_unique() {
        let (_dir, store) = open_temp().await;
        let about = store.insert_page(page("a-propos")).await.unwrap();
        let cgv = store.insert_page(page("cgv")).await.unwrap();

        let dup = store.insert_page(page("a-propos")).await;
        assert!(matches!(dup, Err(StoreError::DuplicateSlug(slug)) if slug == "a-propos"));

        let rename = store
            .update_page(
                &cgv.id,
                PagePatch {
                    slug: Some("a-propos".to_string()),
                    ..PagePatch::default()
                },
            )
            .await;
        assert!(matches!(rename, Err(StoreError::DuplicateSlug(_))));

        let published = store
            .update_page(
                &about.id,
                PagePatch {
                    is_published: Some(true),
                    ..PagePatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(published.is_published);
        assert_eq!(store.list_pages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sections_upsert_by_key_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        {
            let store = JsonCatalogStore::open(path.clone()).await.unwrap();
            store
                .upsert_section("hero_title", "Nos Produits Phares".to_string())
                .await
                .unwrap();
            store
                .upsert_section("contact_info", "Email: contact@boutique.fr".to_string())
                .await
                .unwrap();
            let replaced = store
                .upsert_section("hero_title", "Bienvenue".to_string())
                .await
                .unwrap();
            assert_eq!(replaced.content.value, "Bienvenue");
        }

        let reopened = JsonCatalogStore::open(path).await.unwrap();
        let sections = reopened.list_sections().await.unwrap();
        assert_eq!(sections.len(), 2);
        let hero = sections.iter().find(|s| s.page_key == "hero_title").unwrap();
        assert_eq!(hero.content.value, "Bienvenue");
    }
}
