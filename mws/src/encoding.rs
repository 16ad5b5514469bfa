//! Request body encodings.
//!
//! The gateway accepts two body formats and the choice is fixed per
//! [`Operation`](crate::operation::Operation):
//!
//! - [`Encoding::Form`] — `application/x-www-form-urlencoded`, sent as-is
//! - [`Encoding::SignedXml`] — a one-element XML document whose attributes
//!   carry the parameters, wrapped by a [`Signer`](crate::signer::Signer)
//!   into a PKCS#7 envelope and sent as `application/pkcs7-mime`
//!
//! Attribute values are written without XML escaping. Gateway-side parsers
//! accept the documents produced this way, and escaping would change the
//! signed bytes, so a value containing `"`, `<` or `&` yields a malformed
//! document rather than being rewritten.

use url::form_urlencoded;

use crate::params::RequestParams;

/// Content subtype of form-encoded bodies.
pub const FORM_SUBTYPE: &str = "x-www-form-urlencoded";

/// Content subtype of signed XML bodies.
pub const PKCS7_SUBTYPE: &str = "pkcs7-mime";

/// XML declaration that prefixes every XML request document.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Body encoding of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// `application/x-www-form-urlencoded`, unsigned.
    Form,
    /// XML document wrapped in a PKCS#7 signed envelope.
    SignedXml,
}

impl Encoding {
    /// MIME subtype under `application/`.
    #[must_use]
    pub const fn subtype(self) -> &'static str {
        match self {
            Self::Form => FORM_SUBTYPE,
            Self::SignedXml => PKCS7_SUBTYPE,
        }
    }

    /// Full `Content-Type` header value.
    #[must_use]
    pub fn content_type(self) -> String {
        format!("application/{}", self.subtype())
    }
}

/// Builds `<?xml ...?><{operation}Request k1="v1" k2="v2" />`.
///
/// Every attribute is followed by a single space, attributes appear in
/// insertion order, and values are copied verbatim.
#[must_use]
pub fn xml_document(operation: &str, params: &RequestParams) -> String {
    let mut body = String::with_capacity(64 + params.len() * 32);
    body.push_str(XML_DECLARATION);
    body.push('<');
    body.push_str(operation);
    body.push_str("Request ");
    for (name, value) in params.iter() {
        body.push_str(name);
        body.push_str("=\"");
        body.push_str(value);
        body.push_str("\" ");
    }
    body.push_str("/>");
    body
}

/// Serializes `params` as `application/x-www-form-urlencoded`, keeping order.
#[must_use]
pub fn form_body(params: &RequestParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}
