use serde::{Deserialize, Serialize};

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SendCoinRequest {
        pub to_user: String,
        pub amount: i64,
    }
}

pub mod info {
    use super::*;

    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InfoResponse {
        pub coins: i64,
        pub inventory: Vec<Item>,
        pub coin_history: CoinHistory,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Item {
        #[serde(rename = "type")]
        pub kind: String,
        pub quantity: i64,
    }

    /// Newest entries first in both lists.
    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CoinHistory {
        pub received: Vec<Received>,
        pub sent: Vec<Sent>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Received {
        pub from_user: String,
        pub amount: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Sent {
        pub to_user: String,
        pub amount: i64,
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_coin_uses_camel_case() {
        let request: transfer::SendCoinRequest =
            serde_json::from_value(json!({"toUser": "bob", "amount": 50})).unwrap();
        assert_eq!(request.to_user, "bob");
        assert_eq!(request.amount, 50);
    }

    #[test]
    fn info_wire_format() {
        let info = info::InfoResponse {
            coins: 930,
            inventory: vec![info::Item {
                kind: "cup".to_string(),
                quantity: 1,
            }],
            coin_history: info::CoinHistory {
                received: vec![info::Received {
                    from_user: "bob".to_string(),
                    amount: 10,
                }],
                sent: vec![info::Sent {
                    to_user: "carol".to_string(),
                    amount: 60,
                }],
            },
        };

        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "coins": 930,
                "inventory": [{"type": "cup", "quantity": 1}],
                "coinHistory": {
                    "received": [{"fromUser": "bob", "amount": 10}],
                    "sent": [{"toUser": "carol", "amount": 60}]
                }
            })
        );
    }
}
