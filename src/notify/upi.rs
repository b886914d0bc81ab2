use image::Luma;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qrcode::{EcLevel, QrCode};
use rust_decimal::Decimal;

use super::NotifyError;
use crate::config::UpiConfig;

/// Characters left verbatim inside UPI URI query components, matching what
/// payment apps accept in practice (unreserved marks stay readable).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the `upi://pay?...` deep link for collecting a payment. The amount
/// is always rendered with two decimals; the currency is fixed to INR.
pub fn payment_uri(config: &UpiConfig, amount: Decimal, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={:.2}&cu=INR&tn={}",
        utf8_percent_encode(&config.upi_id, COMPONENT),
        utf8_percent_encode(&config.payee_name, COMPONENT),
        amount,
        utf8_percent_encode(note, COMPONENT),
    )
}

/// Encode a string as a scannable PNG QR raster: medium error correction,
/// at least 400px on a side, with a quiet zone.
pub fn qr_png(data: &str) -> Result<Vec<u8>, NotifyError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|err| NotifyError::Qr(err.to_string()))?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(400, 400)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )
    .map_err(|err| NotifyError::Qr(err.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn test_config() -> UpiConfig {
        UpiConfig {
            upi_id: "shop@upi".to_string(),
            payee_name: "Test Store".to_string(),
        }
    }

    #[test]
    fn payment_uri_has_the_expected_shape() {
        let uri = payment_uri(
            &test_config(),
            Decimal::from_str("250.00").unwrap(),
            "Order ORD-1a2b3c4d",
        );
        assert_eq!(
            uri,
            "upi://pay?pa=shop%40upi&pn=Test%20Store&am=250.00&cu=INR&tn=Order%20ORD-1a2b3c4d"
        );
    }

    #[test]
    fn amount_is_always_two_decimals() {
        let uri = payment_uri(&test_config(), Decimal::from(99), "note");
        assert!(uri.contains("&am=99.00&cu=INR"), "{uri}");
    }

    #[test]
    fn qr_round_trips_through_a_decoder() {
        let uri = payment_uri(
            &test_config(),
            Decimal::from_str("149.50").unwrap(),
            "Order ORD-deadbeef",
        );
        let png = qr_png(&uri).unwrap();

        let luma = image::load_from_memory(&png).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(luma);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_meta, content) = grids[0].decode().unwrap();
        assert_eq!(content, uri);
    }
}
