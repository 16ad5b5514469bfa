//! The fixed set of gateway operations.

use std::fmt;

use crate::encoding::Encoding;
use crate::params::RequestParams;

/// Path prefix every operation name is appended to.
pub const API_PATH: &str = "/webservice/mws/api/";

/// Base URL of the gateway's demo environment.
pub const TESTING_HOST: &str = "https://penelope-demo.yamoney.ru:8083";

/// Base URL of the gateway's production environment.
pub const PRODUCTION_HOST: &str = "https://penelope.yamoney.ru";

/// A logical MWS operation, identified on the wire by its camel-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Lists successful orders.
    ListOrders,
    /// Lists refunded payments.
    ListReturns,
    /// Refunds a successful transfer to the payer.
    ReturnPayment,
    /// Captures a deferred payment.
    ConfirmPayment,
    /// Cancels a deferred payment.
    CancelPayment,
    /// Repeats a card payment using stored card data.
    RepeatCardPayment,
    /// Pays out to a wallet or a bound card.
    ConfirmDeposition,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::ListOrders,
        Self::ListReturns,
        Self::ReturnPayment,
        Self::ConfirmPayment,
        Self::CancelPayment,
        Self::RepeatCardPayment,
        Self::ConfirmDeposition,
    ];

    /// Wire name, used both in the URL and as the XML root tag prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListOrders => "listOrders",
            Self::ListReturns => "listReturns",
            Self::ReturnPayment => "returnPayment",
            Self::ConfirmPayment => "confirmPayment",
            Self::CancelPayment => "cancelPayment",
            Self::RepeatCardPayment => "repeatCardPayment",
            Self::ConfirmDeposition => "confirmDeposition",
        }
    }

    /// How requests for this operation are encoded. Only refunds are signed.
    #[must_use]
    pub const fn encoding(self) -> Encoding {
        match self {
            Self::ReturnPayment => Encoding::SignedXml,
            Self::ListOrders
            | Self::ListReturns
            | Self::ConfirmPayment
            | Self::CancelPayment
            | Self::RepeatCardPayment
            | Self::ConfirmDeposition => Encoding::Form,
        }
    }

    /// Full endpoint URL of this operation under `base`.
    ///
    /// Trailing slashes of `base` are ignored.
    #[must_use]
    pub fn url(self, base: &str) -> String {
        format!("{}{API_PATH}{}", base.trim_end_matches('/'), self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation together with its assembled parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Target operation.
    pub operation: Operation,
    /// Parameters in wire order.
    pub params: RequestParams,
}

impl OperationRequest {
    /// Pairs `operation` with `params`.
    #[must_use]
    pub const fn new(operation: Operation, params: RequestParams) -> Self {
        Self { operation, params }
    }
}
