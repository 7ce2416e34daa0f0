//! 商品、店铺配置、文案区块与内容页 HTTP 接口。
//!
//! `/api/admin/*` 路由挂在 `admin_gate` 之后，未认证请求在提取请求体之前就被拒绝，不会触达存储。

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use boutique_protocol::{ContentPage, ContentSection, Product, ShopConfig, now_rfc3339_nanos};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api::{
        error::ApiError,
        types::{
            ConfigData, CreateProductRequest, PageMutationData, PageRequest, PagesData,
            ProductData, ProductMutationData, ProductsData, PublicProductsData,
            SectionMutationData, SectionRequest, SuccessData, UpdateProductRequest,
        },
    },
    catalog::store::{PagePatch, ProductPatch, StoreError},
    state::AppState,
};

/// 存储错误统一记日志并转成 500（重复 slug 例外，返回 409）。
fn store_failure(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |err| match err {
        StoreError::DuplicateSlug(_) => {
            ApiError::new(StatusCode::CONFLICT, "Une page avec ce slug existe déjà")
        }
        other => {
            error!("{context}: {other}");
            ApiError::internal()
        }
    }
}

/// 去掉首尾空白后的非空字符串。
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 前台商品列表：仅上架商品。
pub(crate) async fn public_products_handler(
    State(state): State<AppState>,
) -> Result<Json<PublicProductsData>, ApiError> {
    let products = state
        .catalog
        .list_products(true)
        .await
        .map_err(store_failure("list public products failed"))?;
    Ok(Json(PublicProductsData {
        count: products.len(),
        products,
    }))
}

/// 前台商品详情：下架或不存在一律 404。
pub(crate) async fn public_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductData>, ApiError> {
    state
        .catalog
        .get_product(&id, true)
        .await
        .map_err(store_failure("get public product failed"))?
        .map(|product| Json(ProductData { product }))
        .ok_or_else(|| ApiError::not_found("Produit non trouvé"))
}

/// 前台店铺配置：未配置时返回默认值。
pub(crate) async fn public_config_handler(
    State(state): State<AppState>,
) -> Result<Json<ConfigData>, ApiError> {
    let config = state
        .catalog
        .shop_config()
        .await
        .map_err(store_failure("load shop config failed"))?
        .unwrap_or_default();
    Ok(Json(ConfigData { config }))
}

/// 后台商品列表（含下架商品）。
pub(crate) async fn admin_list_products_handler(
    State(state): State<AppState>,
) -> Result<Json<ProductsData>, ApiError> {
    let products = state
        .catalog
        .list_products(false)
        .await
        .map_err(store_failure("list products failed"))?;
    Ok(Json(ProductsData { products }))
}

/// 后台新建商品：六个字段全部必填。
pub(crate) async fn admin_create_product_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Json<ProductMutationData>, ApiError> {
    let Json(req) = body?;
    let (
        Some(name),
        Some(description),
        Some(price),
        Some(video_url),
        Some(thumbnail_url),
        Some(order_link),
    ) = (
        non_blank(req.name),
        non_blank(req.description),
        req.price,
        non_blank(req.video_url),
        non_blank(req.thumbnail_url),
        non_blank(req.order_link),
    )
    else {
        return Err(ApiError::bad_request("Tous les champs sont requis"));
    };
    let Some(price) = price.parse() else {
        return Err(ApiError::bad_request("Prix invalide"));
    };

    let product = state
        .catalog
        .insert_product(Product::create(
            name,
            description,
            price,
            video_url,
            thumbnail_url,
            order_link,
        ))
        .await
        .map_err(store_failure("create product failed"))?;
    info!(product_id = %product.id, "product created");
    Ok(Json(ProductMutationData {
        success: true,
        product,
        message: "Produit créé avec succès",
    }))
}

/// 后台商品详情（含下架商品）。
pub(crate) async fn admin_get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductData>, ApiError> {
    state
        .catalog
        .get_product(&id, false)
        .await
        .map_err(store_failure("get product failed"))?
        .map(|product| Json(ProductData { product }))
        .ok_or_else(|| ApiError::not_found("Produit non trouvé"))
}

/// 后台局部更新商品。
pub(crate) async fn admin_update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductMutationData>, ApiError> {
    let Json(req) = body?;
    let price = match req.price {
        Some(raw) => Some(raw.parse().ok_or_else(|| ApiError::bad_request("Prix invalide"))?),
        None => None,
    };
    let patch = ProductPatch {
        name: non_blank(req.name),
        description: non_blank(req.description),
        price,
        video_url: non_blank(req.video_url),
        thumbnail_url: non_blank(req.thumbnail_url),
        order_link: non_blank(req.order_link),
        is_active: req.is_active,
    };
    let product = state
        .catalog
        .update_product(&id, patch)
        .await
        .map_err(store_failure("update product failed"))?
        .ok_or_else(|| ApiError::not_found("Produit non trouvé"))?;
    info!(product_id = %product.id, "product updated");
    Ok(Json(ProductMutationData {
        success: true,
        product,
        message: "Produit mis à jour avec succès",
    }))
}

/// 后台删除商品。
pub(crate) async fn admin_delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessData>, ApiError> {
    let deleted = state
        .catalog
        .delete_product(&id)
        .await
        .map_err(store_failure("delete product failed"))?;
    if !deleted {
        return Err(ApiError::not_found("Produit non trouvé"));
    }
    info!(product_id = %id, "product deleted");
    Ok(Json(SuccessData {
        success: true,
        message: "Produit supprimé avec succès".to_string(),
    }))
}

/// 后台读取店铺配置。
pub(crate) async fn admin_get_shop_config_handler(
    State(state): State<AppState>,
) -> Result<Json<ConfigData>, ApiError> {
    let config = state
        .catalog
        .shop_config()
        .await
        .map_err(store_failure("load shop config failed"))?
        .unwrap_or_default();
    Ok(Json(ConfigData { config }))
}

/// 后台整体替换店铺配置。
pub(crate) async fn admin_update_shop_config_handler(
    State(state): State<AppState>,
    body: Result<Json<ShopConfig>, JsonRejection>,
) -> Result<Json<ConfigData>, ApiError> {
    let Json(config) = body?;
    if config.shop_name.trim().is_empty() {
        return Err(ApiError::bad_request("Nom de la boutique requis"));
    }
    let config = state
        .catalog
        .save_shop_config(config)
        .await
        .map_err(store_failure("save shop config failed"))?;
    info!("shop config updated");
    Ok(Json(ConfigData { config }))
}

/// 后台文案区块列表（仅已保存的区块，未保存的由前端使用默认文案）。
pub(crate) async fn admin_list_sections_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSection>>, ApiError> {
    let sections = state
        .catalog
        .list_sections()
        .await
        .map_err(store_failure("list content sections failed"))?;
    Ok(Json(sections))
}

/// 后台写入单个文案区块。
pub(crate) async fn admin_upsert_section_handler(
    State(state): State<AppState>,
    body: Result<Json<SectionRequest>, JsonRejection>,
) -> Result<Json<SectionMutationData>, ApiError> {
    let Json(req) = body?;
    let (Some(page_key), Some(value)) = (
        non_blank(req.page_key),
        req.content.and_then(|content| content.value),
    ) else {
        return Err(ApiError::bad_request("Clé et contenu requis"));
    };
    if !ContentSection::is_known_key(&page_key) {
        return Err(ApiError::bad_request(format!("Section inconnue: {page_key}")));
    }
    let section = state
        .catalog
        .upsert_section(&page_key, value)
        .await
        .map_err(store_failure("save content section failed"))?;
    info!(page_key = %section.page_key, "content section updated");
    Ok(Json(SectionMutationData {
        success: true,
        section,
        message: "Contenu mis à jour avec succès",
    }))
}

/// 后台内容页列表。
pub(crate) async fn admin_list_pages_handler(
    State(state): State<AppState>,
) -> Result<Json<PagesData>, ApiError> {
    let pages = state
        .catalog
        .list_pages()
        .await
        .map_err(store_failure("list pages failed"))?;
    Ok(Json(PagesData { pages }))
}

/// 后台新建内容页：标题与 slug 必填。
pub(crate) async fn admin_create_page_handler(
    State(state): State<AppState>,
    body: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<PageMutationData>, ApiError> {
    let Json(req) = body?;
    let (Some(slug), Some(title)) = (non_blank(req.slug), non_blank(req.title)) else {
        return Err(ApiError::bad_request("Titre et slug requis"));
    };
    let now = now_rfc3339_nanos();
    let page = state
        .catalog
        .insert_page(ContentPage {
            id: Uuid::new_v4().to_string(),
            slug,
            title,
            content: req.content.unwrap_or_default(),
            is_published: req.is_published.unwrap_or(false),
            created_at: now.clone(),
            updated_at: now,
        })
        .await
        .map_err(store_failure("create page failed"))?;
    info!(page_id = %page.id, slug = %page.slug, "page created");
    Ok(Json(PageMutationData {
        success: true,
        page,
        message: "Page créée avec succès",
    }))
}

/// 后台局部更新内容页。
pub(crate) async fn admin_update_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<PageMutationData>, ApiError> {
    let Json(req) = body?;
    let patch = PagePatch {
        slug: non_blank(req.slug),
        title: non_blank(req.title),
        content: req.content,
        is_published: req.is_published,
    };
    let page = state
        .catalog
        .update_page(&id, patch)
        .await
        .map_err(store_failure("update page failed"))?
        .ok_or_else(|| ApiError::not_found("Page non trouvée"))?;
    Ok(Json(PageMutationData {
        success: true,
        page,
        message: "Page mise à jour avec succès",
    }))
}

/// 后台删除内容页。
pub(crate) async fn admin_delete_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessData>, ApiError> {
    let deleted = state
        .catalog
        .delete_page(&id)
        .await
        .map_err(store_failure("delete page failed"))?;
    if !deleted {
        return Err(ApiError::not_found("Page non trouvée"));
    }
    Ok(Json(SuccessData {
        success: true,
        message: "Page supprimée avec succès".to_string(),
    }))
}
