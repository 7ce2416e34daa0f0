//! API 请求/响应类型。

use boutique_protocol::{ContentPage, ContentSection, Product, ShopConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 管理员登录请求；`password` 保留原始 JSON 值以区分“缺失”与“类型不对”。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub(crate) password: Option<Value>,
}

/// 登录口令字段的归类结果。
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PasswordInput {
    /// 缺失或假值（`null`、`""`、`false`、`0`）。
    Missing,
    Text(String),
    /// 存在但不是字符串，无法参与校验。
    Unusable,
}

impl LoginRequest {
    pub(crate) fn into_password(self) -> PasswordInput {
        match self.password {
            None | Some(Value::Null) | Some(Value::Bool(false)) => PasswordInput::Missing,
            Some(Value::String(text)) if text.is_empty() => PasswordInput::Missing,
            Some(Value::String(text)) => PasswordInput::Text(text),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => PasswordInput::Missing,
            Some(_) => PasswordInput::Unusable,
        }
    }
}

/// 登录成功返回。
#[derive(Debug, Serialize)]
pub(crate) struct LoginData {
    pub(crate) success: bool,
    pub(crate) token: String,
    pub(crate) message: &'static str,
}

/// 会话检查返回（成功与失败共用）。
#[derive(Debug, Serialize)]
pub(crate) struct SessionStatus {
    pub(crate) authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<&'static str>,
}

/// 价格输入：表单可能提交数字或数字字符串。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// 解析为有限正数；空串、非数字、非正数都视为无效。
    pub(crate) fn parse(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(raw) => raw.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// 新建商品请求。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateProductRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<PriceInput>,
    #[serde(default)]
    pub(crate) video_url: Option<String>,
    #[serde(default)]
    pub(crate) thumbnail_url: Option<String>,
    #[serde(default)]
    pub(crate) order_link: Option<String>,
}

/// 商品局部更新请求，缺省字段保持原值。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateProductRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<PriceInput>,
    #[serde(default)]
    pub(crate) video_url: Option<String>,
    #[serde(default)]
    pub(crate) thumbnail_url: Option<String>,
    #[serde(default)]
    pub(crate) order_link: Option<String>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
}

/// 前台商品列表。
#[derive(Debug, Serialize)]
pub(crate) struct PublicProductsData {
    pub(crate) products: Vec<Product>,
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductsData {
    pub(crate) products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductData {
    pub(crate) product: Product,
}

/// 商品写操作返回。
#[derive(Debug, Serialize)]
pub(crate) struct ProductMutationData {
    pub(crate) success: bool,
    pub(crate) product: Product,
    pub(crate) message: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigData {
    pub(crate) config: ShopConfig,
}

/// 文案区块写入请求：`{page_key, content: {value}}`。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SectionRequest {
    #[serde(default)]
    pub(crate) page_key: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<SectionValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SectionValue {
    #[serde(default)]
    pub(crate) value: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SectionMutationData {
    pub(crate) success: bool,
    pub(crate) section: ContentSection,
    pub(crate) message: &'static str,
}

/// 内容页新建/更新请求。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageRequest {
    #[serde(default)]
    pub(crate) slug: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PagesData {
    pub(crate) pages: Vec<ContentPage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageMutationData {
    pub(crate) success: bool,
    pub(crate) page: ContentPage,
    pub(crate) message: &'static str,
}

/// 无数据体的写操作返回。
#[derive(Debug, Serialize)]
pub(crate) struct SuccessData {
    pub(crate) success: bool,
    pub(crate) message: String,
}

/// 上传成功返回。
#[derive(Debug, Serialize)]
pub(crate) struct UploadData {
    pub(crate) success: bool,
    pub(crate) url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) message: String,
}

/// 删除已上传媒体请求。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteUploadRequest {
    #[serde(rename = "publicId", default)]
    pub(crate) public_id: Option<String>,
}

/// 登录 token 有效期（秒）。
pub(crate) const SESSION_TTL_SEC: u64 = 24 * 60 * 60;
