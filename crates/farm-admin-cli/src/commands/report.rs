use serde_json::{json, Value};

use farm_admin_sdk::contract::QueryResult;
use farm_admin_sdk::dispatch::Report;

use crate::output;

pub fn to_json(report: &Report) -> Value {
    match report {
        Report::Deployed(address) => json!({ "contract": address.as_str() }),
        Report::Submitted(receipts) => json!({
            "submitted": receipts
                .iter()
                .map(|r| json!({
                    "contract": r.contract.as_str(),
                    "method": r.method,
                    "extrinsic": r.extrinsic,
                    "block": r.block,
                }))
                .collect::<Vec<_>>()
        }),
        Report::Cancelled => json!({ "cancelled": true }),
        Report::Query(QueryResult(value)) => value.clone().unwrap_or(Value::Null),
    }
}

pub fn render(report: &Report) {
    if output::is_json() {
        output::json_output(to_json(report));
        return;
    }

    match report {
        Report::Deployed(address) => {
            output::success("farm deployed");
            output::label("address", address.as_str());
        }
        Report::Submitted(receipts) => {
            for r in receipts {
                output::receipt(r);
            }
        }
        Report::Cancelled => output::warn("cancelled, nothing was submitted"),
        Report::Query(QueryResult(Some(value))) => output::json_output(value.clone()),
        Report::Query(QueryResult(None)) => output::warn("the contract returned no value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_admin_sdk::chain::Receipt;
    use farm_admin_sdk::ChainAddress;

    #[test]
    fn submitted_lists_every_receipt_in_order() {
        let contract = ChainAddress::from_account_id([1; 32], 42);
        let report = Report::Submitted(vec![
            Receipt {
                extrinsic: "0x01".into(),
                block: "0xb1".into(),
                contract: contract.clone(),
                method: "PSP22::increase_allowance",
            },
            Receipt {
                extrinsic: "0x02".into(),
                block: "0xb2".into(),
                contract,
                method: "owner_start_new_farm",
            },
        ]);
        let v = to_json(&report);
        assert_eq!(v["submitted"][0]["method"], "PSP22::increase_allowance");
        assert_eq!(v["submitted"][1]["extrinsic"], "0x02");
        assert_eq!(v["submitted"][1]["block"], "0xb2");
    }

    #[test]
    fn cancelled_and_empty_query() {
        assert_eq!(to_json(&Report::Cancelled), json!({"cancelled": true}));
        assert_eq!(to_json(&Report::Query(QueryResult(None))), Value::Null);
    }
}
