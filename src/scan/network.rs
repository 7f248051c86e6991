//! Network interfaces and their addresses.

use std::net::IpAddr;

use serde_json::{json, Map, Value};
use sysinfo::Networks;

use super::probe::{Probe, ProbeContext, ProbeResult, ScanKind};

pub struct NetworkProbe;

impl Probe for NetworkProbe {
    fn kind(&self) -> ScanKind {
        ScanKind::Network
    }

    fn collect(&self, _ctx: &mut ProbeContext) -> ProbeResult {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces = Map::new();

        for (name, data) in networks.list() {
            let addresses: Vec<Value> = data
                .ip_networks()
                .iter()
                .map(|net| address_entry(net.addr, net.prefix))
                .collect();

            interfaces.insert(
                name.clone(),
                json!({
                    "mac": data.mac_address().to_string(),
                    "addresses": addresses,
                }),
            );
        }

        ProbeResult::new(Value::Object(interfaces))
    }
}

fn address_entry(addr: IpAddr, prefix: u8) -> Value {
    let family = match addr {
        IpAddr::V4(_) => "AF_INET",
        IpAddr::V6(_) => "AF_INET6",
    };

    json!({
        "family": family,
        "address": addr.to_string(),
        "prefix": prefix,
    })
}
