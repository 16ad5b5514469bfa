//! The MWS gateway client.
//!
//! [`GatewayClient`] turns each logical operation into exactly one HTTP
//! POST against `{base}/webservice/mws/api/{operation}`:
//!
//! 1. Parameters are assembled in wire order, with timestamps taken from a
//!    single reading of the [`Clock`].
//! 2. The body is encoded as a form (most operations) or as an XML document
//!    that is then signed (refunds). Signing finishes before the request
//!    is sent; a signing failure means no request is sent.
//! 3. The [`Transport`] posts the body and the raw response text is handed
//!    back. A non-2xx status or an empty body is an error.
//!
//! Every step is written to the injected [`Logger`].
//!
//! ```no_run
//! # async fn run(transport: impl mws::transport::Transport + 'static) -> Result<(), mws::MwsError> {
//! use mws::client::GatewayClient;
//! use mws::config::GatewayConfig;
//!
//! let config = GatewayConfig::new("175720", "10643")
//!     .with_credentials("lib/shop.cer", "lib/private.key", "secret");
//! let client = GatewayClient::builder(config).transport(transport).build()?;
//! let orders = client.list_orders().await?;
//! println!("{}", orders.body);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::{GatewayConfig, SecurityType};
use crate::encoding::{Encoding, form_body, xml_document};
use crate::error::{ConfigurationError, MwsError, TransportError};
use crate::log::{Logger, TracingLogger};
use crate::operation::{Operation, OperationRequest};
use crate::params::{RequestParams, fixed_two_decimals, flag};
use crate::signer::{OpensslSigner, Signer};
use crate::timestamp::{Clock, SystemClock, UnixTimestamp, format_date, format_date_for_mws};
use crate::transport::{Transport, TransportRequest};

/// Lower bound of the `listReturns` window.
pub const RETURNS_SINCE: &str = "2015-01-01T00:00:00.000Z";

/// Reason attached to every refund.
pub const RETURN_CAUSE: &str = "Нет товара";

/// Currency `confirmPayment` always sends, whatever the configured currency.
pub const CONFIRM_PAYMENT_CURRENCY: &str = "RUB";

/// Response format requested from the listing operations.
pub const OUTPUT_FORMAT: &str = "XML";

/// A successful gateway answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Raw response body, typically XML.
    pub body: String,
}

/// Client for the gateway's Merchant Web Services API.
///
/// Holds no per-request state and can be shared between tasks.
pub struct GatewayClient {
    config: GatewayConfig,
    base_url: String,
    logger: Arc<dyn Logger>,
    signer: Arc<dyn Signer>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GatewayClient`].
pub struct GatewayClientBuilder {
    config: GatewayConfig,
    logger: Option<Arc<dyn Logger>>,
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl fmt::Debug for GatewayClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClientBuilder")
            .field("config", &self.config)
            .field("has_logger", &self.logger.is_some())
            .field("has_signer", &self.signer.is_some())
            .field("has_transport", &self.transport.is_some())
            .field("has_clock", &self.clock.is_some())
            .finish()
    }
}

impl GatewayClientBuilder {
    /// Sets the diagnostic sink (default: [`TracingLogger`]).
    #[must_use]
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Sets the signer (default: [`OpensslSigner`] configured from the config).
    #[must_use]
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Sets the HTTP transport. Required.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the clock (default: [`SystemClock`]).
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if no transport was given, the host
    /// override is invalid, a timeout is zero, or the security type is
    /// `PKCS7` and a signing credential is missing.
    pub fn build(self) -> Result<GatewayClient, ConfigurationError> {
        let transport = self.transport.ok_or(ConfigurationError::MissingTransport)?;
        let base_url = self.config.base_url()?;
        self.config.check_timeouts()?;
        if self.config.security_type == SecurityType::Pkcs7 {
            self.config.signing_credentials()?;
        }
        let signer = self.signer.unwrap_or_else(|| {
            Arc::new(
                OpensslSigner::new()
                    .with_program(self.config.openssl.clone())
                    .with_timeout(self.config.signing_timeout()),
            )
        });
        Ok(GatewayClient {
            config: self.config,
            base_url,
            logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
            signer,
            transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

impl GatewayClient {
    /// Starts building a client for `config`.
    #[must_use]
    pub fn builder(config: GatewayConfig) -> GatewayClientBuilder {
        GatewayClientBuilder {
            config,
            logger: None,
            signer: None,
            transport: None,
            clock: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the resolved gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns successful orders created up to now.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn list_orders(&self) -> Result<GatewayResponse, MwsError> {
        let now = format_date_for_mws(&self.clock.now());
        let params = RequestParams::new()
            .with("requestDT", now.as_str())
            .with("outputFormat", OUTPUT_FORMAT)
            .with("shopId", self.config.shop_id.as_str())
            .with("orderCreatedDatetimeLessOrEqual", now);
        self.execute(OperationRequest::new(Operation::ListOrders, params))
            .await
    }

    /// Returns refunds made since [`RETURNS_SINCE`].
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn list_returns(&self) -> Result<GatewayResponse, MwsError> {
        let now = format_date_for_mws(&self.clock.now());
        let params = RequestParams::new()
            .with("requestDT", now.as_str())
            .with("outputFormat", OUTPUT_FORMAT)
            .with("shopId", self.config.shop_id.as_str())
            .with("from", RETURNS_SINCE)
            .with("till", now);
        self.execute(OperationRequest::new(Operation::ListReturns, params))
            .await
    }

    /// Refunds `amount` of transfer `invoice_id` to the payer.
    ///
    /// This is the only signed operation.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Configuration`] if signing credentials are
    /// missing, [`MwsError::Signing`] if signing fails, and
    /// [`MwsError::Transport`] if the exchange fails.
    pub async fn return_payment(
        &self,
        invoice_id: &str,
        amount: Decimal,
    ) -> Result<GatewayResponse, MwsError> {
        let now = self.clock.now();
        let params = RequestParams::new()
            .with("clientOrderId", UnixTimestamp::from_datetime(&now).to_string())
            .with("requestDT", format_date(&now))
            .with("invoiceId", invoice_id)
            .with("shopId", self.config.shop_id.as_str())
            .with("amount", fixed_two_decimals(amount))
            .with("currency", self.config.currency.as_str())
            .with("cause", RETURN_CAUSE);
        self.execute(OperationRequest::new(Operation::ReturnPayment, params))
            .await
    }

    /// Captures `amount` of deferred payment `order_id`.
    ///
    /// The currency is always [`CONFIRM_PAYMENT_CURRENCY`].
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        amount: Decimal,
    ) -> Result<GatewayResponse, MwsError> {
        let now = self.clock.now();
        let params = RequestParams::new()
            .with("clientOrderId", UnixTimestamp::from_datetime(&now).to_string())
            .with("requestDT", format_date(&now))
            .with("orderId", order_id)
            .with("amount", amount.to_string())
            .with("currency", CONFIRM_PAYMENT_CURRENCY);
        self.execute(OperationRequest::new(Operation::ConfirmPayment, params))
            .await
    }

    /// Cancels deferred payment `order_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn cancel_payment(&self, order_id: &str) -> Result<GatewayResponse, MwsError> {
        let params = RequestParams::new()
            .with("requestDT", format_date(&self.clock.now()))
            .with("orderId", order_id);
        self.execute(OperationRequest::new(Operation::CancelPayment, params))
            .await
    }

    /// Charges the card used for `invoice_id` again.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn repeat_card_payment(
        &self,
        invoice_id: &str,
        amount: Decimal,
    ) -> Result<GatewayResponse, MwsError> {
        let now = self.clock.now();
        let params = RequestParams::new()
            .with("clientOrderId", UnixTimestamp::from_datetime(&now).to_string())
            .with("invoiceId", invoice_id)
            .with("amount", amount.to_string());
        self.execute(OperationRequest::new(Operation::RepeatCardPayment, params))
            .await
    }

    /// Pays `amount` out to wallet `destination`.
    ///
    /// Empty, `0` and `false` values are left out of the request.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn confirm_deposition_by_wallet(
        &self,
        invoice_id: &str,
        amount: Decimal,
        destination: &str,
    ) -> Result<GatewayResponse, MwsError> {
        let now = self.clock.now();
        let params = RequestParams::new()
            .with("clientOrderId", UnixTimestamp::from_datetime(&now).to_string())
            .with("requestDT", format_date(&now))
            .with("invoiceId", invoice_id)
            .with("destination", destination)
            .with("amount", amount.to_string())
            .with("currency", self.config.currency.as_str())
            .with("offerAccepted", flag(true))
            .without_falsy();
        self.execute(OperationRequest::new(Operation::ConfirmDeposition, params))
            .await
    }

    /// Pays `amount` out to the bound card `card_synonym` of account `account_number`.
    ///
    /// Empty, `0` and `false` values are left out of the request.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the exchange fails.
    pub async fn confirm_deposition_by_card(
        &self,
        invoice_id: &str,
        amount: Decimal,
        account_number: &str,
        card_synonym: &str,
    ) -> Result<GatewayResponse, MwsError> {
        let now = self.clock.now();
        let params = RequestParams::new()
            .with("clientOrderId", UnixTimestamp::from_datetime(&now).to_string())
            .with("requestDT", format_date(&now))
            .with("invoiceId", invoice_id)
            .with("destination", account_number)
            .with("cardSynonym", card_synonym)
            .with("amount", amount.to_string())
            .with("currency", self.config.currency.as_str())
            .with("offerAccepted", flag(true))
            .without_falsy();
        self.execute(OperationRequest::new(Operation::ConfirmDeposition, params))
            .await
    }

    /// Sends an assembled request and returns the gateway's answer.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::prepare`]; additionally returns
    /// [`MwsError::Transport`] if the exchange fails, the status is not 2xx
    /// or the body is empty.
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "mws.execute", skip_all, fields(operation = %request.operation), err)
    )]
    pub async fn execute(&self, request: OperationRequest) -> Result<GatewayResponse, MwsError> {
        let operation = request.operation;
        self.logger.info(&format!("Start {operation}"));

        let result = match self.prepare(&request).await {
            Ok(prepared) => self.send(operation, prepared).await.map_err(MwsError::from),
            Err(err) => Err(err),
        };

        match &result {
            Ok(response) => self.logger.info(&response.body),
            Err(err) => self.logger.info(&format!("{operation} failed: {err}")),
        }
        result
    }

    /// Encodes (and signs, for XML operations) `request` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Configuration`] if a signed operation lacks
    /// credentials and [`MwsError::Signing`] if signing fails.
    pub async fn prepare(&self, request: &OperationRequest) -> Result<TransportRequest, MwsError> {
        let operation = request.operation;
        self.logger
            .info(&format!("{operation} params: {:?}", request.params));

        let encoding = operation.encoding();
        let body = match encoding {
            Encoding::Form => form_body(&request.params).into_bytes(),
            Encoding::SignedXml => {
                let credentials = self.config.signing_credentials()?;
                let document = xml_document(operation.name(), &request.params);
                self.logger.info(&format!("{operation} XML: {document}"));
                self.signer
                    .sign(document.as_bytes(), &credentials, self.logger.as_ref())
                    .await?
                    .into_bytes()
            }
        };

        Ok(TransportRequest {
            url: operation.url(&self.base_url),
            content_type: encoding.content_type(),
            body,
        })
    }

    async fn send(
        &self,
        operation: Operation,
        request: TransportRequest,
    ) -> Result<GatewayResponse, TransportError> {
        self.logger.info(&format!(
            "{operation} Request: {} {}",
            request.url,
            request.body_text()
        ));

        let response = self.transport.post(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            });
        }
        if response.body.is_empty() {
            return Err(TransportError::EmptyBody {
                status: response.status,
            });
        }
        Ok(GatewayResponse {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SigningError;
    use crate::testing::{FakeSigner, MemoryLogger, RecordingTransport};
    use crate::timestamp::FixedClock;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use std::str::FromStr;
    use url::form_urlencoded;

    const OK_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><listOrdersResponse status="0"/>"#;

    fn moscow_afternoon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 13, 45, 30)
            .unwrap()
    }

    fn config() -> GatewayConfig {
        GatewayConfig::new("175720", "10643").with_credentials(
            "lib/shop.cer",
            "lib/private.key",
            "secret",
        )
    }

    struct Harness {
        client: GatewayClient,
        transport: RecordingTransport,
        signer: FakeSigner,
        log: MemoryLogger,
    }

    fn harness_with(config: GatewayConfig, transport: RecordingTransport, signer: FakeSigner) -> Harness {
        let log = MemoryLogger::default();
        let client = GatewayClient::builder(config)
            .transport(transport.clone())
            .signer(signer.clone())
            .logger(log.clone())
            .clock(FixedClock::new(moscow_afternoon()))
            .build()
            .unwrap();
        Harness {
            client,
            transport,
            signer,
            log,
        }
    }

    fn harness() -> Harness {
        harness_with(
            config(),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::default(),
        )
    }

    fn only_request(h: &Harness) -> TransportRequest {
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 1, "exactly one POST per operation");
        requests.into_iter().next().unwrap()
    }

    fn parse_form(request: &TransportRequest) -> Vec<(String, String)> {
        assert_eq!(request.content_type, "application/x-www-form-urlencoded");
        form_urlencoded::parse(&request.body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_list_orders() {
        let h = harness();
        let response = h.client.list_orders().await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, OK_BODY);

        let request = only_request(&h);
        assert_eq!(
            request.url,
            "https://penelope-demo.yamoney.ru:8083/webservice/mws/api/listOrders"
        );
        assert_eq!(
            parse_form(&request),
            pairs(&[
                ("requestDT", "2024-03-01T13:45:30.000Z"),
                ("outputFormat", "XML"),
                ("shopId", "175720"),
                ("orderCreatedDatetimeLessOrEqual", "2024-03-01T13:45:30.000Z"),
            ])
        );
        assert!(h.signer.signed().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns() {
        let h = harness();
        h.client.list_returns().await.unwrap();

        let request = only_request(&h);
        assert!(request.url.ends_with("/webservice/mws/api/listReturns"));
        assert_eq!(
            parse_form(&request),
            pairs(&[
                ("requestDT", "2024-03-01T13:45:30.000Z"),
                ("outputFormat", "XML"),
                ("shopId", "175720"),
                ("from", "2015-01-01T00:00:00.000Z"),
                ("till", "2024-03-01T13:45:30.000Z"),
            ])
        );
    }

    #[tokio::test]
    async fn test_return_payment_is_signed_xml() {
        let h = harness();
        h.client.return_payment("42", Decimal::from(10)).await.unwrap();

        let signed = h.signer.signed();
        assert_eq!(signed.len(), 1);
        let (document, credentials) = &signed[0];
        let document = String::from_utf8(document.clone()).unwrap();
        assert_eq!(
            document,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<returnPaymentRequest clientOrderId="1709289930" "#,
                r#"requestDT="2024-03-01T13:45:30.000+03:00" invoiceId="42" "#,
                r#"shopId="175720" amount="10.00" currency="10643" cause="Нет товара" />"#
            )
        );
        assert_eq!(credentials.passphrase, "secret");

        let request = only_request(&h);
        assert_eq!(request.content_type, "application/pkcs7-mime");
        assert!(request.url.ends_with("/webservice/mws/api/returnPayment"));
        assert_eq!(request.body, FakeSigner::armour(document.as_bytes()));
    }

    #[tokio::test]
    async fn test_return_payment_rounds_amount() {
        let h = harness();
        h.client.return_payment("7", dec("0.005")).await.unwrap();
        let (document, _) = &h.signer.signed()[0];
        assert!(String::from_utf8_lossy(document).contains(r#"amount="0.01""#));
    }

    #[tokio::test]
    async fn test_return_payment_without_credentials_never_signs_or_sends() {
        let h = harness_with(
            GatewayConfig::new("175720", "10643"),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::default(),
        );
        let err = h
            .client
            .return_payment("42", Decimal::from(10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MwsError::Configuration(ConfigurationError::MissingCredential("certificate"))
        ));
        assert!(h.signer.signed().is_empty());
        assert!(h.transport.requests().is_empty());
        assert!(h.log.contains("returnPayment failed: missing certificate"));
    }

    #[tokio::test]
    async fn test_signing_failure_prevents_http_call() {
        let h = harness_with(
            config(),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::failing(),
        );
        let err = h
            .client
            .return_payment("42", Decimal::from(10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MwsError::Signing(SigningError::Failed { status: Some(1), .. })
        ));
        assert_eq!(h.signer.signed().len(), 1);
        assert!(h.transport.requests().is_empty());
        assert!(h.log.contains("returnPayment failed: OpenSSL call failed: 1"));
    }

    #[tokio::test]
    async fn test_confirm_payment_always_rub() {
        let h = harness_with(
            GatewayConfig::new("175720", "10643"),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::default(),
        );
        h.client.confirm_payment("2000000001", dec("15.5")).await.unwrap();

        assert_eq!(
            parse_form(&only_request(&h)),
            pairs(&[
                ("clientOrderId", "1709289930"),
                ("requestDT", "2024-03-01T13:45:30.000+03:00"),
                ("orderId", "2000000001"),
                ("amount", "15.5"),
                ("currency", "RUB"),
            ])
        );
    }

    #[tokio::test]
    async fn test_cancel_payment() {
        let h = harness();
        h.client.cancel_payment("2000000001").await.unwrap();
        let request = only_request(&h);
        assert!(request.url.ends_with("/cancelPayment"));
        assert_eq!(
            parse_form(&request),
            pairs(&[
                ("requestDT", "2024-03-01T13:45:30.000+03:00"),
                ("orderId", "2000000001"),
            ])
        );
    }

    #[tokio::test]
    async fn test_repeat_card_payment_has_no_request_dt() {
        let h = harness();
        h.client.repeat_card_payment("9", dec("100.00")).await.unwrap();
        assert_eq!(
            parse_form(&only_request(&h)),
            pairs(&[
                ("clientOrderId", "1709289930"),
                ("invoiceId", "9"),
                ("amount", "100.00"),
            ])
        );
    }

    #[tokio::test]
    async fn test_confirm_deposition_by_wallet() {
        let h = harness();
        h.client
            .confirm_deposition_by_wallet("11", dec("50"), "410011234567")
            .await
            .unwrap();
        let request = only_request(&h);
        assert!(request.url.ends_with("/webservice/mws/api/confirmDeposition"));
        assert_eq!(
            parse_form(&request),
            pairs(&[
                ("clientOrderId", "1709289930"),
                ("requestDT", "2024-03-01T13:45:30.000+03:00"),
                ("invoiceId", "11"),
                ("destination", "410011234567"),
                ("amount", "50"),
                ("currency", "10643"),
                ("offerAccepted", "true"),
            ])
        );
    }

    #[tokio::test]
    async fn test_confirm_deposition_drops_falsy_values() {
        let h = harness_with(
            GatewayConfig::new("175720", ""),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::default(),
        );
        h.client
            .confirm_deposition_by_wallet("11", Decimal::ZERO, "")
            .await
            .unwrap();
        assert_eq!(
            parse_form(&only_request(&h)),
            pairs(&[
                ("clientOrderId", "1709289930"),
                ("requestDT", "2024-03-01T13:45:30.000+03:00"),
                ("invoiceId", "11"),
                ("offerAccepted", "true"),
            ])
        );
    }

    #[tokio::test]
    async fn test_confirm_deposition_by_card() {
        let h = harness();
        h.client
            .confirm_deposition_by_card("11", dec("50.00"), "4100322062290", "")
            .await
            .unwrap();
        assert_eq!(
            parse_form(&only_request(&h)),
            pairs(&[
                ("clientOrderId", "1709289930"),
                ("requestDT", "2024-03-01T13:45:30.000+03:00"),
                ("invoiceId", "11"),
                ("destination", "4100322062290"),
                ("amount", "50.00"),
                ("currency", "10643"),
                ("offerAccepted", "true"),
            ])
        );

        let h = harness();
        h.client
            .confirm_deposition_by_card("11", dec("50.00"), "4100322062290", "syn-1")
            .await
            .unwrap();
        assert_eq!(
            parse_form(&only_request(&h))[4],
            ("cardSynonym".to_owned(), "syn-1".to_owned())
        );
    }

    #[tokio::test]
    async fn test_production_endpoint() {
        let h = harness_with(
            config().with_testing(false),
            RecordingTransport::responding(200, OK_BODY),
            FakeSigner::default(),
        );
        h.client.list_orders().await.unwrap();
        assert!(
            only_request(&h)
                .url
                .starts_with("https://penelope.yamoney.ru/webservice/mws/api/")
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let h = harness_with(
            config(),
            RecordingTransport::responding(500, "boom"),
            FakeSigner::default(),
        );
        let err = h.client.list_orders().await.unwrap_err();
        match err {
            MwsError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.log.contains("listOrders failed: unexpected HTTP status 500"));
    }

    #[tokio::test]
    async fn test_empty_body_is_transport_error() {
        let h = harness_with(
            config(),
            RecordingTransport::responding(200, ""),
            FakeSigner::default(),
        );
        let err = h.client.cancel_payment("1").await.unwrap_err();
        assert!(matches!(
            err,
            MwsError::Transport(TransportError::EmptyBody { status: 200 })
        ));
    }

    #[tokio::test]
    async fn test_request_failure_is_transport_error() {
        let h = harness_with(
            config(),
            RecordingTransport::failing("connection refused"),
            FakeSigner::default(),
        );
        let err = h.client.list_returns().await.unwrap_err();
        assert!(matches!(err, MwsError::Transport(TransportError::Request(_))));
        assert!(h.log.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_lifecycle_is_logged() {
        let h = harness();
        h.client.return_payment("42", Decimal::from(10)).await.unwrap();
        let lines = h.log.lines();
        assert_eq!(lines[0], "Start returnPayment");
        assert!(lines[1].starts_with("returnPayment params: {"));
        assert!(lines[2].starts_with("returnPayment XML: <?xml"));
        assert_eq!(lines[3], "fake signer invoked");
        assert!(lines[4].starts_with(
            "returnPayment Request: https://penelope-demo.yamoney.ru:8083/webservice/mws/api/returnPayment -----BEGIN PKCS7-----"
        ));
        assert_eq!(lines[5], OK_BODY);
    }

    #[tokio::test]
    async fn test_prepare_does_not_send() {
        let h = harness();
        let request = OperationRequest::new(
            Operation::CancelPayment,
            RequestParams::new().with("orderId", "5"),
        );
        let prepared = h.client.prepare(&request).await.unwrap();
        assert_eq!(prepared.body, b"orderId=5");
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn test_build_requires_transport() {
        let err = GatewayClient::builder(config()).build().unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingTransport));
    }

    #[test]
    fn test_build_checks_pkcs7_credentials_eagerly() {
        let err = GatewayClient::builder(
            GatewayConfig::new("1", "643").with_security_type(SecurityType::Pkcs7),
        )
        .transport(RecordingTransport::responding(200, OK_BODY))
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential(_)));

        // MD5 defers the check to the first signed operation
        let client = GatewayClient::builder(GatewayConfig::new("1", "643"))
            .transport(RecordingTransport::responding(200, OK_BODY))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://penelope-demo.yamoney.ru:8083");
    }

    #[test]
    fn test_build_rejects_invalid_host() {
        let err = GatewayClient::builder(config().with_host("not a url"))
            .transport(RecordingTransport::responding(200, OK_BODY))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidHost { .. }));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let err = GatewayClient::builder(
            config().with_request_timeout(std::time::Duration::from_nanos(0)),
        )
        .transport(RecordingTransport::responding(200, OK_BODY))
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::ZeroTimeout("request")));

        // Half a second survives intact
        let client = GatewayClient::builder(
            config().with_signing_timeout(std::time::Duration::from_millis(500)),
        )
        .transport(RecordingTransport::responding(200, OK_BODY))
        .build()
        .unwrap();
        assert_eq!(client.config().signing_timeout().as_millis(), 500);
    }
}
