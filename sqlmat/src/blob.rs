///
/// Host arrays in and out of typed BLOBs.
///
/// Thin layer over `sqlmat_codec::typed_blob` that speaks `NumericArray`
/// and turns an origin mismatch into a `Warning`.
///

use sqlmat_codec::{Platform, typed_blob};
use tracing::warn;

use crate::array::NumericArray;
use crate::config::Config;
use crate::errors::Result;
use crate::warning::Warning;

/// Encodes `array` with the running platform as origin.
pub fn encode_array(array: &NumericArray, config: &Config) -> Result<Vec<u8>> {
    let blob = typed_blob::encode(
        array.element_type(),
        array.dims(),
        array.data(),
        config.max_blob_size,
    )?;
    Ok(blob)
}

/// Decodes a typed BLOB. A blob written on another platform or byte order
/// still decodes; its payload is taken verbatim and a warning is recorded.
pub fn decode_array(blob: &[u8], warnings: &mut Vec<Warning>) -> Result<NumericArray> {
    let decoded = typed_blob::decode(blob)?;
    if decoded.origin_differs(&Platform::current()) {
        let warning = Warning::DifferentOrigin {
            platform: decoded.platform.clone(),
            endian: decoded.endian,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
    NumericArray::new(decoded.element_type, decoded.dims, decoded.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use sqlmat_codec::{ElementType, Endian};

    #[test]
    fn test_round_trip_keeps_shape_and_payload() {
        let array = NumericArray::from_elements(vec![2, 3], &[1i32, 2, 3, 4, 5, 6]).unwrap();
        let blob = encode_array(&array, &Config::default()).unwrap();
        let mut warnings = Vec::new();
        let decoded = decode_array(&blob, &mut warnings).unwrap();
        assert_eq!(decoded, array);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_three_dimensional_round_trip() {
        let values: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let array = NumericArray::from_elements(vec![2, 3, 4], &values).unwrap();
        let blob = encode_array(&array, &Config::default()).unwrap();
        let decoded = decode_array(&blob, &mut Vec::new()).unwrap();
        assert_eq!(decoded.dims(), &[2, 3, 4]);
        assert_eq!(decoded.to_vec::<f32>(), Some(values));
    }

    #[test]
    fn test_configured_limit_applies() {
        let array = NumericArray::row(&[0u8; 64]);
        let config = Config::default().with_max_blob_size(64);
        let result = encode_array(&array, &config);
        assert!(matches!(result, Err(Error::SizeExceeded { max: 64, .. })));
    }

    #[test]
    fn test_foreign_origin_warns_but_decodes() {
        let origin = Platform::new("SOL2", Endian::Big);
        let data: Vec<u8> = [1.0f64, 2.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let blob =
            typed_blob::encode_for(&origin, ElementType::Double, &[1, 2], &data, usize::MAX).unwrap();

        let mut warnings = Vec::new();
        let decoded = decode_array(&blob, &mut warnings).unwrap();
        assert_eq!(decoded.data(), data.as_slice());
        assert_eq!(
            warnings,
            vec![Warning::DifferentOrigin {
                platform: "SOL2".to_string(),
                endian: Endian::Big,
            }]
        );
    }

    #[test]
    fn test_corrupted_blob_is_an_error() {
        let array = NumericArray::row(&[1u16, 2]);
        let mut blob = encode_array(&array, &Config::default()).unwrap();
        blob[0] ^= 0xFF;
        assert!(matches!(decode_array(&blob, &mut Vec::new()), Err(Error::BadMagic)));
    }
}
