//! Browser host: object URLs and a hidden `<a download>` in the page.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{BlobPropertyBag, Document, HtmlAnchorElement, HtmlElement, Url};

use super::{DownloadHost, ObjectUrl};
use crate::blob::Blob;
use crate::error::HostError;

fn script_error(e: JsValue) -> HostError {
    HostError::Script(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Host bound to the current window's document.
pub struct BrowserHost {
    document: Document,
    body: HtmlElement,
}

impl BrowserHost {
    /// Fails with [`HostError::Unsupported`] outside a page with a `<body>`
    /// (Node.js, workers).
    pub fn from_window() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::Unsupported("no window object"))?;
        let document = window
            .document()
            .ok_or(HostError::Unsupported("no document"))?;
        let body = document
            .body()
            .ok_or(HostError::Unsupported("document has no body"))?;
        Ok(Self { document, body })
    }
}

impl DownloadHost for BrowserHost {
    type Anchor = HtmlAnchorElement;

    fn create_object_url(&self, blob: &Blob) -> Result<ObjectUrl, HostError> {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(blob.bytes()));
        let options = BlobPropertyBag::new();
        options.set_type(blob.media_type());
        let js_blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(script_error)?;
        let url = Url::create_object_url_with_blob(&js_blob).map_err(script_error)?;
        Ok(ObjectUrl::new(url))
    }

    fn attach_anchor(&self, url: &ObjectUrl, filename: &str) -> Result<HtmlAnchorElement, HostError> {
        let anchor: HtmlAnchorElement = self
            .document
            .create_element("a")
            .map_err(script_error)?
            .dyn_into()
            .map_err(|_| HostError::Unsupported("<a> is not an HTMLAnchorElement"))?;
        anchor
            .style()
            .set_property("display", "none")
            .map_err(script_error)?;
        anchor.set_href(url.as_str());
        anchor.set_download(filename);
        self.body.append_child(&anchor).map_err(script_error)?;
        Ok(anchor)
    }

    fn click(&self, anchor: &HtmlAnchorElement) -> Result<(), HostError> {
        anchor.click();
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) -> Result<(), HostError> {
        Url::revoke_object_url(url.as_str()).map_err(script_error)
    }
}
