use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};

use crate::{RequestError, Result};

/// Immutable description of one outbound HTTP call.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl RequestDescriptor {
    /// Parses `method` and `url` into a descriptor.
    ///
    /// Only `http` and `https` URLs are accepted.
    pub fn parse(method: &str, url: &str, body: Option<Vec<u8>>) -> Result<Self> {
        let method = Method::from_bytes(method.trim().as_bytes())
            .map_err(|_| RequestError::InvalidMethod(method.to_owned()))?;
        let parsed = Url::parse(url.trim()).map_err(|source| RequestError::InvalidUrl {
            url: url.to_owned(),
            source,
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(RequestError::UnsupportedScheme(other.to_owned())),
        }

        Ok(Self {
            method,
            url: parsed,
            body,
            headers: HeaderMap::new(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::RequestDescriptor;
    use crate::RequestError;

    #[test]
    fn parse_keeps_method_url_and_body() {
        let descriptor =
            RequestDescriptor::parse("post", "http://example/items", Some(b"{}".to_vec()))
                .expect("descriptor must parse");

        // Methods are case-sensitive tokens; lowercase is an extension method.
        assert_eq!(descriptor.method().as_str(), "post");
        assert_eq!(descriptor.url().as_str(), "http://example/items");
        assert_eq!(descriptor.body(), Some(&b"{}"[..]));
        assert!(descriptor.headers().is_empty());
    }

    #[test]
    fn parse_accepts_standard_methods() {
        let descriptor =
            RequestDescriptor::parse("GET", "https://example/fail", None).expect("must parse");
        assert_eq!(descriptor.method(), &Method::GET);
        assert_eq!(descriptor.body(), None);
    }

    #[test]
    fn parse_rejects_malformed_url() {
        let err = RequestDescriptor::parse("GET", "not a url", None).expect_err("must fail");
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
        assert!(err.is_construction());
    }

    #[test]
    fn parse_rejects_invalid_method() {
        let err = RequestDescriptor::parse("GE T", "http://example", None).expect_err("must fail");
        assert!(matches!(err, RequestError::InvalidMethod(_)));
    }

    #[test]
    fn parse_rejects_non_http_scheme() {
        let err =
            RequestDescriptor::parse("GET", "ftp://example/file", None).expect_err("must fail");
        match err {
            RequestError::UnsupportedScheme(scheme) => assert_eq!(scheme, "ftp"),
            other => panic!("expected unsupported scheme, got {other:?}"),
        }
    }
}
