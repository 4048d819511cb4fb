//! 統合テスト共通の入力データ

#![allow(dead_code)]

use networking_report::signature::{PointerEvent, SignatureCapture};
use networking_report_common::{names, RawInput, SignatureImage};

pub const VALID_REMARK: &str =
    "All equipment installed, cabled and tested. Customer briefed on usage.";

pub fn valid_input() -> RawInput {
    [
        (names::SERVICE_SUPPORT_MOBILE, "9876543210"),
        (names::REPORT_DATE, "2025-05-16"),
        (names::STARTING_DATE, "2025-05-12"),
        (names::COMPLETION_DATE, "2025-05-15"),
        (names::CUSTOMER_NAME_ADDRESS, "Acme Traders, 12 MG Road, Pune"),
        (names::SPOC_NAME, "Ravi Kumar"),
        (names::SPOC_DESIGNATION, "IT Manager"),
        (names::SPOC_CONTACT, "9123456780"),
        (names::WAN_IP_TYPE, "Static"),
        (names::WAN_IP_REMARK, "203.0.113.10"),
        ("connectionRemark0", "Rack, server room"),
        ("testResult0", "OK"),
        (names::LSSE_REMARK, VALID_REMARK),
        (names::CUSTOMER_NAME, "Ravi Kumar"),
        (names::CUSTOMER_SIGN_DATE, "2025-05-16"),
        (names::ENGINEER_NAME, "S. Engineer"),
        (names::ENGINEER_SIGN_DATE, "2025-05-16"),
    ]
    .into_iter()
    .collect()
}

/// 簡単な筆跡を描いて書き出した署名
pub fn drawn_signature() -> SignatureImage {
    let mut capture = SignatureCapture::new(400, 200);
    for event in [
        PointerEvent::Down { x: 30.0, y: 150.0 },
        PointerEvent::Move { x: 120.0, y: 40.0 },
        PointerEvent::Move { x: 200.0, y: 160.0 },
        PointerEvent::Move { x: 360.0, y: 60.0 },
        PointerEvent::Up,
    ] {
        capture.handle(event);
    }
    capture.export_image().expect("署名の書き出しに失敗")
}

pub fn blank_signature() -> SignatureImage {
    SignatureCapture::new(400, 200)
        .export_image()
        .expect("署名の書き出しに失敗")
}
