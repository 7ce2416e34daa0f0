// 文件职责：
// 1) 定义店面服务与管理后台共用的协议数据结构（商品、店铺配置、内容页、管理会话）。
// 2) 提供时间戳换算等跨端一致的基础函数。
// 3) 作为 Rust 侧协议唯一代码源，字段名与数据库列保持一致（snake_case）。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 管理会话描述：令牌校验通过后的瞬时结果，从不持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    // 恒为 true；未认证时不存在该结构。
    pub authenticated: bool,
    // 令牌过期时间（ISO-8601，毫秒精度 UTC）。
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // 商品 ID（uuid v4）。
    pub id: String,
    pub name: String,
    pub description: String,
    // 售价（欧元）。
    pub price: f64,
    // 商品展示视频地址。
    pub video_url: String,
    // 缩略图地址。
    pub thumbnail_url: String,
    // 外部下单链接。
    pub order_link: String,
    // 是否在前台展示。
    pub is_active: bool,
    // 创建时间（RFC3339）。
    pub created_at: String,
    // 更新时间（RFC3339）。
    pub updated_at: String,
}

impl Product {
    /// 由已校验的新建字段构造商品，自动填充 id 与时间戳。
    pub fn create(
        name: String,
        description: String,
        price: f64,
        video_url: String,
        thumbnail_url: String,
        order_link: String,
    ) -> Self {
        let now = now_rfc3339_nanos();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            price,
            video_url,
            thumbnail_url,
            order_link,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    // 店铺名称。
    pub shop_name: String,
    // 背景色（CSS 颜色值）。
    pub background_color: String,
    // 背景图地址（可选）。
    pub background_image_url: Option<String>,
    // 是否启用深色模式。
    pub dark_mode: bool,
    // 页脚文案。
    pub footer_text: String,
}

impl Default for ShopConfig {
    /// 未配置时对外展示的默认店铺配置。
    fn default() -> Self {
        Self {
            shop_name: "Ma Boutique CBD".to_string(),
            background_color: "#ffffff".to_string(),
            background_image_url: None,
            dark_mode: false,
            footer_text: "© 2024 Ma Boutique CBD. Tous droits réservés.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPage {
    // 内容页 ID（uuid v4）。
    pub id: String,
    // URL 片段（如 `mentions-legales`）。
    pub slug: String,
    pub title: String,
    // 正文（Markdown/HTML 由前端解释）。
    pub content: String,
    // 是否已发布。
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// 首页等固定位置可编辑的文案区块键。
pub const CONTENT_SECTION_KEYS: &[&str] = &[
    "hero_title",
    "hero_subtitle",
    "about_section",
    "contact_info",
    "legal_notice",
];

/// 文案区块（按 `page_key` 唯一）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub page_key: String,
    pub content: SectionContent,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    pub value: String,
}

impl ContentSection {
    pub fn is_known_key(key: &str) -> bool {
        CONTENT_SECTION_KEYS.contains(&key)
    }
}

/// 生成纳秒精度 UTC 时间戳（RFC3339）。
pub fn now_rfc3339_nanos() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// 把 unix 秒换算为 ISO-8601（毫秒精度，`Z` 结尾），超出可表示范围时返回 `None`。
pub fn unix_to_iso8601(secs: u64) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::{ContentSection, Product, SectionContent, ShopConfig, unix_to_iso8601};

    #[test]
    fn iso8601_matches_javascript_to_iso_string() {
        assert_eq!(
            unix_to_iso8601(1_700_000_000).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(unix_to_iso8601(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(unix_to_iso8601(u64::MAX), None);
    }

    #[test]
    fn new_product_is_active_with_fresh_id() {
        let a = Product::create(
            "Huile".into(),
            "Huile 10%".into(),
            29.9,
            "https://v".into(),
            "https://t".into(),
            "https://o".into(),
        );
        let b = Product::create(
            "Huile".into(),
            "Huile 10%".into(),
            29.9,
            "https://v".into(),
            "https://t".into(),
            "https://o".into(),
        );
        assert!(a.is_active);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn default_shop_config_serializes_null_background() {
        let value = serde_json::to_value(ShopConfig::default()).unwrap();
        assert_eq!(value["shop_name"], "Ma Boutique CBD");
        assert!(value["background_image_url"].is_null());
        assert_eq!(value["dark_mode"], false);
    }

    #[test]
    fn content_section_wire_shape() {
        let section = ContentSection {
            page_key: "hero_title".to_string(),
            content: SectionContent {
                value: "Nos Produits Phares".to_string(),
            },
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["page_key"], "hero_title");
        assert_eq!(value["content"]["value"], "Nos Produits Phares");
        assert!(ContentSection::is_known_key("legal_notice"));
        assert!(!ContentSection::is_known_key("custom_cgv"));
    }
}
