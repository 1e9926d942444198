//! Bank name to bank code lookup.
//!
//! Clients send display names; Paystack's resolve endpoint wants the CBN bank
//! code. Names are matched after lowercasing and dropping whitespace and
//! punctuation, so `"GT Bank"`, `"gtbank"` and `"G.T. Bank"` are one key.

/// Known banks: every accepted spelling, then the bank code.
const BANKS: &[(&[&str], &str)] = &[
    (&["accessbank", "access", "accessbankplc", "diamondbank"], "044"),
    (&["citibank", "citibanknigeria"], "023"),
    (&["ecobank", "ecobanknigeria"], "050"),
    (&["fidelitybank", "fidelity"], "070"),
    (&["firstbank", "firstbankofnigeria", "firstbanknigeria", "fbn"], "011"),
    (&["firstcitymonumentbank", "fcmb"], "214"),
    (&["globusbank", "globus"], "00103"),
    (
        &[
            "gtbank",
            "gtb",
            "guarantytrustbank",
            "gtco",
            "guarantytrustholdingcompany",
        ],
        "058",
    ),
    (&["heritagebank", "heritage"], "030"),
    (&["jaizbank", "jaiz"], "301"),
    (&["keystonebank", "keystone"], "082"),
    (&["kudabank", "kuda", "kudamicrofinancebank"], "50211"),
    (&["moniepoint", "moniepointmfb", "moniepointmicrofinancebank"], "50515"),
    (&["opay", "opaydigitalservices", "paycom"], "999992"),
    (&["palmpay"], "999991"),
    (&["polarisbank", "polaris"], "076"),
    (&["providusbank", "providus"], "101"),
    (&["stanbicibtcbank", "stanbicibtc", "stanbic"], "221"),
    (&["standardcharteredbank", "standardchartered"], "068"),
    (&["sterlingbank", "sterling"], "232"),
    (&["suntrustbank", "suntrust"], "100"),
    (&["titantrustbank", "titantrust"], "102"),
    (&["unionbank", "unionbankofnigeria"], "032"),
    (&["unitedbankforafrica", "uba"], "033"),
    (&["unitybank", "unity"], "215"),
    (&["wemabank", "wema", "alat"], "035"),
    (&["zenithbank", "zenith"], "057"),
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Look up the bank code for a display name.
#[must_use]
pub fn bank_code(name: &str) -> Option<&'static str> {
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }

    BANKS
        .iter()
        .find(|(aliases, _)| aliases.contains(&key.as_str()))
        .map(|(_, code)| *code)
}
