//! 页面：解析后的 DOM 与页面地址

use markup5ever_rcdom::{Handle, RcDom};
use url::Url;

use crate::parsers::html::{find_body, html_to_dom, serialize_document};
use crate::translation::error::{TranslationError, TranslationResult};

pub struct Page {
    dom: RcDom,
    url: Option<Url>,
    encoding: String,
}

impl Page {
    /// 解析 HTML；`url` 用于站点排除判断，可省略
    pub fn parse(html: &[u8], url: Option<&str>) -> TranslationResult<Self> {
        let dom = html_to_dom(html, "utf-8")
            .map_err(|e| TranslationError::ParseError(format!("HTML 解析失败: {}", e)))?;
        let url = url
            .map(|u| {
                Url::parse(u).map_err(|e| TranslationError::ParseError(format!("无效的页面地址 {}: {}", u, e)))
            })
            .transpose()?;

        Ok(Self {
            dom,
            url,
            encoding: "utf-8".to_string(),
        })
    }

    pub fn from_dom(dom: RcDom, url: Option<Url>) -> Self {
        Self {
            dom,
            url,
            encoding: "utf-8".to_string(),
        }
    }

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// 全量扫描的根节点：`body`，缺失时退回整个文档
    pub fn scan_root(&self) -> Handle {
        find_body(&self.dom.document).unwrap_or_else(|| self.dom.document.clone())
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.url.as_ref().and_then(|u| u.host_str())
    }

    pub fn to_html(&self) -> TranslationResult<String> {
        let bytes = serialize_document(&self.dom, &self.encoding)
            .map_err(|e| TranslationError::SerializationError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| TranslationError::SerializationError(e.to_string()))
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url).finish()
    }
}
