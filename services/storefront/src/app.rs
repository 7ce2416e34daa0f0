//! 店面应用装配：路由、CORS 与监听。

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::{
    auth::{
        gate::admin_gate,
        handlers::{admin_login_handler, admin_session_handler},
    },
    catalog::handlers::{
        admin_create_page_handler, admin_create_product_handler, admin_delete_page_handler,
        admin_delete_product_handler, admin_get_product_handler, admin_get_shop_config_handler,
        admin_list_pages_handler, admin_list_products_handler, admin_list_sections_handler,
        admin_update_page_handler, admin_update_product_handler, admin_update_shop_config_handler,
        admin_upsert_section_handler, public_config_handler, public_product_handler,
        public_products_handler,
    },
    config::Config,
    media::{
        handlers::{admin_delete_upload_handler, admin_upload_handler},
        upload::UPLOAD_BODY_LIMIT,
    },
    state::AppState,
};

/// 店面入口：装配状态并启动 HTTP 服务。
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    if !state.config.has_admin_password_hash() {
        warn!("ADMIN_PASSWORD_HASH is not set; every admin login will be rejected");
    }
    info!(
        data_path = %state.config.data_path.display(),
        media_uploads = state.config.cloudinary.is_some(),
        "storefront state ready"
    );
    let addr = state.config.addr.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("boutique storefront listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// 构建完整路由；后台路由（登录接口除外）统一经过 `admin_gate`。
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let admin = Router::new()
        .route(
            "/api/admin/products",
            get(admin_list_products_handler).post(admin_create_product_handler),
        )
        .route(
            "/api/admin/products/{id}",
            get(admin_get_product_handler)
                .put(admin_update_product_handler)
                .delete(admin_delete_product_handler),
        )
        .route(
            "/api/admin/config",
            get(admin_get_shop_config_handler).put(admin_update_shop_config_handler),
        )
        .route(
            "/api/admin/content",
            get(admin_list_sections_handler).put(admin_upsert_section_handler),
        )
        .route(
            "/api/admin/pages",
            get(admin_list_pages_handler).post(admin_create_page_handler),
        )
        .route(
            "/api/admin/pages/{id}",
            put(admin_update_page_handler).delete(admin_delete_page_handler),
        )
        .route(
            "/api/admin/upload",
            post(admin_upload_handler)
                .delete(admin_delete_upload_handler)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate));

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/admin/auth",
            post(admin_login_handler).get(admin_session_handler),
        )
        .route("/api/products", get(public_products_handler))
        .route("/api/products/{id}", get(public_product_handler))
        .route("/api/config", get(public_config_handler))
        .merge(admin)
        .layer(cors)
        .with_state(state)
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}
