mod common;

use adas_parser::{formats::szd::SZD_NAME, AttrValue};
use approx::assert_relative_eq;
use common::load_array;

#[test]
fn test_szd_labeled() {
    let szd = load_array("szd93#be");
    assert_eq!(szd.dims(), ["lower_index".to_string(), "Te".to_string()]);
    assert_eq!(szd.shape(), &[3, 3]);
    assert_eq!(szd.name(), Some(SZD_NAME));
    assert_eq!(szd.attr("element"), Some("Be"));
    assert_eq!(szd.attr("name"), Some("szd93_be"));
    assert_eq!(
        szd.coord("lower_index").unwrap().labels(),
        Some(vec![
            Some(&AttrValue::Integer(0)),
            Some(&AttrValue::Integer(1)),
            Some(&AttrValue::Integer(2)),
        ])
    );
    assert_eq!(
        szd.coord("Te").unwrap().to_f64_vec(),
        Some(vec![1.0, 10.0, 100.0])
    );

    assert_relative_eq!(
        szd.data()[[0, 2].as_slice()],
        5e-14,
        epsilon = 0.0,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        szd.data()[[2, 1].as_slice()],
        1e-20,
        epsilon = 0.0,
        max_relative = 1e-12
    );
    // Be+2 is not tabulated at 1 eV
    assert!(szd.data()[[2, 0].as_slice()].is_nan());
}
