//! Message protocol
//!
//! Every message carries a type tag and a payload from a closed set. Tags
//! render as upper-snake strings (`PLACE_ORDER_LIMIT`, `RESPONSE_CANCEL_ORDERS`)
//! so journals and external participants can read them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use matching_engine::{LevelSnapshot, TopOfBook};
use serde::{Deserialize, Serialize};
use venue_types::ids::{OrderId, Timestamp, Volume};
use venue_types::numeric::Money;
use venue_types::order::{Direction, Order};
use venue_types::trade::Trade;

/// Name the scheduler itself answers to
pub const SIMULATION_NAME: &str = "SIMULATION";

/// Separator for multi-target address lists
pub const TARGET_SEPARATOR: char = '|';

const RESPONSE_PREFIX: &str = "RESPONSE_";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    PlaceOrderLimit,
    PlaceOrderMarket,
    CancelOrders,
    RetrieveOrders,
    RetrieveL1,
    RetrieveBookAsk,
    RetrieveBookBid,
    SubscribeEventOrderMarket,
    SubscribeEventOrderLimit,
    SubscribeEventTrade,
    SubscribeEventOrderTrade,
    EventOrderMarket,
    EventOrderLimit,
    EventTrade,
    EventSimulationStart,
    EventSimulationStop,
    /// Reply to the wrapped request type
    Response(Box<MessageType>),
    /// Any tag outside the exchange protocol, carried verbatim
    Custom(String),
}

impl MessageType {
    const NAMED: [(MessageType, &'static str); 16] = [
        (MessageType::PlaceOrderLimit, "PLACE_ORDER_LIMIT"),
        (MessageType::PlaceOrderMarket, "PLACE_ORDER_MARKET"),
        (MessageType::CancelOrders, "CANCEL_ORDERS"),
        (MessageType::RetrieveOrders, "RETRIEVE_ORDERS"),
        (MessageType::RetrieveL1, "RETRIEVE_L1"),
        (MessageType::RetrieveBookAsk, "RETRIEVE_BOOK_ASK"),
        (MessageType::RetrieveBookBid, "RETRIEVE_BOOK_BID"),
        (MessageType::SubscribeEventOrderMarket, "SUBSCRIBE_EVENT_ORDER_MARKET"),
        (MessageType::SubscribeEventOrderLimit, "SUBSCRIBE_EVENT_ORDER_LIMIT"),
        (MessageType::SubscribeEventTrade, "SUBSCRIBE_EVENT_TRADE"),
        (MessageType::SubscribeEventOrderTrade, "SUBSCRIBE_EVENT_ORDER_TRADE"),
        (MessageType::EventOrderMarket, "EVENT_ORDER_MARKET"),
        (MessageType::EventOrderLimit, "EVENT_ORDER_LIMIT"),
        (MessageType::EventTrade, "EVENT_TRADE"),
        (MessageType::EventSimulationStart, "EVENT_SIMULATION_START"),
        (MessageType::EventSimulationStop, "EVENT_SIMULATION_STOP"),
    ];

    /// The `RESPONSE_<self>` tag
    pub fn response(&self) -> MessageType {
        MessageType::Response(Box::new(self.clone()))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, MessageType::Response(_))
    }

    /// Request type a response answers, if this is a response
    pub fn request(&self) -> Option<&MessageType> {
        match self {
            MessageType::Response(inner) => Some(inner),
            _ => None,
        }
    }

    fn named(&self) -> Option<&'static str> {
        Self::NAMED.iter().find(|(ty, _)| ty == self).map(|(_, name)| *name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Response(inner) => write!(f, "{}{}", RESPONSE_PREFIX, inner),
            MessageType::Custom(tag) => f.write_str(tag),
            other => f.write_str(other.named().unwrap_or_default()),
        }
    }
}

impl FromStr for MessageType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((ty, _)) = Self::NAMED.iter().find(|(_, name)| *name == s) {
            return Ok(ty.clone());
        }
        match s.strip_prefix(RESPONSE_PREFIX) {
            Some(inner) if !inner.is_empty() => Ok(MessageType::Response(Box::new(inner.parse()?))),
            _ => Ok(MessageType::Custom(s.to_string())),
        }
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        MessageType::from(s.to_string())
    }
}

impl From<MessageType> for String {
    fn from(ty: MessageType) -> Self {
        ty.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderLimitPayload {
    pub direction: Direction,
    pub volume: Volume,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderLimitResponsePayload {
    pub id: OrderId,
    pub request: PlaceOrderLimitPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderMarketPayload {
    pub direction: Direction,
    pub volume: Volume,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderMarketResponsePayload {
    pub id: OrderId,
    pub request: PlaceOrderMarketPayload,
}

/// One cancellation request: the order and the volume to take off it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: OrderId,
    pub volume: Volume,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelOrdersPayload {
    pub cancellations: Vec<Cancellation>,
}

/// Remaining volume after a cancellation; 0 for unknown or gone orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationResult {
    pub id: OrderId,
    pub remaining_volume: Volume,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelOrdersResponsePayload {
    pub cancellations: Vec<CancellationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveOrdersPayload {
    pub ids: Vec<OrderId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveOrdersResponsePayload {
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveL1ResponsePayload {
    pub time: Timestamp,
    #[serde(flatten)]
    pub top: TopOfBook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveBookPayload {
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveBookResponsePayload {
    pub time: Timestamp,
    pub levels: Vec<LevelSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeEventTradeByOrderPayload {
    pub id: OrderId,
}

/// Payload carried by a message
///
/// Requests without fields (`RETRIEVE_L1`, the plain subscriptions, the
/// lifecycle broadcasts) carry `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MessagePayload {
    #[default]
    Empty,
    Success(String),
    Error(String),
    PlaceOrderLimit(PlaceOrderLimitPayload),
    PlaceOrderLimitResponse(PlaceOrderLimitResponsePayload),
    PlaceOrderMarket(PlaceOrderMarketPayload),
    PlaceOrderMarketResponse(PlaceOrderMarketResponsePayload),
    CancelOrders(CancelOrdersPayload),
    CancelOrdersResponse(CancelOrdersResponsePayload),
    RetrieveOrders(RetrieveOrdersPayload),
    RetrieveOrdersResponse(RetrieveOrdersResponsePayload),
    RetrieveL1Response(RetrieveL1ResponsePayload),
    RetrieveBook(RetrieveBookPayload),
    RetrieveBookResponse(RetrieveBookResponsePayload),
    SubscribeEventTradeByOrder(SubscribeEventTradeByOrderPayload),
    EventOrder(Order),
    EventTrade(Trade),
    /// Free-form key/value payload for participants outside the exchange protocol
    Generic(BTreeMap<String, String>),
}

impl MessagePayload {
    pub fn success(text: impl Into<String>) -> Self {
        MessagePayload::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        MessagePayload::Error(text.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MessagePayload::Error(_))
    }

    /// Success or error text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            MessagePayload::Success(text) | MessagePayload::Error(text) => Some(text),
            _ => None,
        }
    }
}

/// A message in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub occurrence: Timestamp,
    pub arrival: Timestamp,
    pub source: String,
    pub targets: Vec<String>,
    pub message_type: MessageType,
    pub payload: MessagePayload,
    /// Enqueue order, assigned by the queue
    pub sequence: u64,
}

impl Message {
    /// Build a message due at `occurrence + delay`
    ///
    /// `targets` may be a `|`-separated list; each entry is resolved
    /// independently on delivery.
    pub fn new(
        occurrence: Timestamp,
        delay: Timestamp,
        source: impl Into<String>,
        targets: &str,
        message_type: MessageType,
        payload: MessagePayload,
    ) -> Self {
        Self {
            occurrence,
            arrival: occurrence + delay,
            source: source.into(),
            targets: split_targets(targets),
            message_type,
            payload,
            sequence: 0,
        }
    }

    /// Transport delay between occurrence and arrival
    pub fn delay(&self) -> Timestamp {
        self.arrival - self.occurrence
    }

    pub fn targets_string(&self) -> String {
        self.targets.join(&TARGET_SEPARATOR.to_string())
    }
}

pub fn split_targets(targets: &str) -> Vec<String> {
    targets
        .split(TARGET_SEPARATOR)
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips_through_text() {
        for (ty, name) in MessageType::NAMED.iter() {
            assert_eq!(ty.to_string(), *name);
            assert_eq!(MessageType::from(*name), *ty);
        }
    }

    #[test]
    fn test_response_tags() {
        let ty = MessageType::CancelOrders.response();
        assert_eq!(ty.to_string(), "RESPONSE_CANCEL_ORDERS");
        assert_eq!(MessageType::from("RESPONSE_CANCEL_ORDERS"), ty);
        assert_eq!(ty.request(), Some(&MessageType::CancelOrders));
        assert!(!MessageType::CancelOrders.is_response());
    }

    #[test]
    fn test_unknown_tags_are_custom() {
        assert_eq!(MessageType::from("PING"), MessageType::Custom("PING".to_string()));
        assert_eq!(
            MessageType::from("RESPONSE_PING"),
            MessageType::Response(Box::new(MessageType::Custom("PING".to_string())))
        );
        assert_eq!(MessageType::from("RESPONSE_"), MessageType::Custom("RESPONSE_".to_string()));
    }

    #[test]
    fn test_message_arrival_and_targets() {
        let msg = Message::new(10, 3, "A", "B|C*|*", MessageType::RetrieveL1, MessagePayload::Empty);
        assert_eq!(msg.arrival, 13);
        assert_eq!(msg.delay(), 3);
        assert_eq!(msg.targets, vec!["B", "C*", "*"]);
        assert_eq!(msg.targets_string(), "B|C*|*");

        let early = Message::new(10, -4, "A", "B", MessageType::RetrieveL1, MessagePayload::Empty);
        assert_eq!(early.arrival, 6);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(
            0,
            1,
            "TRADER",
            "EXCHANGE",
            MessageType::PlaceOrderLimit,
            MessagePayload::PlaceOrderLimit(PlaceOrderLimitPayload {
                direction: Direction::Buy,
                volume: 5,
                price: Money::from_whole_and_cents(10, 25),
            }),
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"PLACE_ORDER_LIMIT\""));
        assert!(json.contains("\"place_order_limit\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
