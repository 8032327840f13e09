mod common;

use adas_parser::{
    formats::{pec::PEC_NAME, AdasData, OutputMode},
    provider::load,
    AdasError, AttrValue,
};
use approx::assert_relative_eq;
use common::{fixtures, load_array, load_fixture};

const PEC: &str = "pec96#h_pju#h0";

#[test]
fn test_pec_labeled() {
    let pec = load_array(PEC);
    assert_eq!(
        pec.dims(),
        ["line", "TYPE", "ne", "Te"].map(String::from).as_slice()
    );
    assert_eq!(pec.shape(), &[2, 2, 2, 3]);
    assert_eq!(pec.name(), Some(PEC_NAME));
    assert_eq!(pec.unit(), Some("m3/s"));
    assert_eq!(pec.attr("title"), Some("/H  0 PHOTON EMISSIVITY COEFFICIENTS/"));

    let ne = pec.coord("ne").unwrap();
    assert_eq!(ne.to_f64_vec(), Some(vec![1e19, 1e20]));
    assert_eq!(ne.unit(), Some("m-3"));
    assert_eq!(
        pec.coord("Te").unwrap().to_f64_vec(),
        Some(vec![1.0, 5.0, 10.0])
    );
    assert_eq!(
        pec.coord("line").unwrap().labels(),
        Some(vec![
            Some(&AttrValue::from("4860.6 A")),
            Some(&AttrValue::from("6561.9 A"))
        ])
    );

    let at = |line: &str, kind: &str, ne: f64, te: f64| {
        pec.value_at(&[
            ("line", line.into()),
            ("TYPE", kind.into()),
            ("ne", ne.into()),
            ("Te", te.into()),
        ])
        .unwrap()
    };
    assert_relative_eq!(at("6561.9 A", "EXCIT", 1e19, 1.0), 1e-6);
    assert_relative_eq!(at("6561.9 A", "RECOM", 1e20, 10.0), 1e-7);
    assert_relative_eq!(at("4860.6 A", "EXCIT", 1e20, 5.0), 1.1e-5);
    // no recombination block for H-beta
    assert!(at("4860.6 A", "RECOM", 1e19, 1.0).is_nan());
}

#[test]
fn test_pec_annotations_become_coordinates() {
    let pec = load_array(PEC);

    let filmem = pec.coord("FILMEM").unwrap();
    assert!(filmem.is_scalar());
    assert_eq!(filmem.scalar_value(), Some(&AttrValue::from("pec96#h_pju#h0")));

    let isel = pec.coord("ISEL").unwrap();
    assert_eq!(isel.dims(), ["line".to_string(), "TYPE".to_string()]);
    assert_eq!(isel.values()[[1, 1].as_slice()], Some(AttrValue::Integer(2)));
    assert_eq!(isel.values()[[0, 1].as_slice()], None);
}

#[test]
fn test_pec_raw() {
    let AdasData::PecBlocks(blocks) = load_fixture(PEC, OutputMode::Raw) else {
        panic!("raw pec output expected");
    };
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].line, "4860.6 A");
    assert_eq!(blocks[1].annotation("TYPE"), Some(&AttrValue::from("RECOM")));
    assert_eq!(blocks[1].annotation("INDM"), Some(&AttrValue::from("T")));
    assert_eq!(blocks[0].densities, vec![1e13, 1e14]);
    assert_eq!(blocks[0].temperatures, vec![1.0, 5.0, 10.0]);
    assert_relative_eq!(blocks[0].values[[1, 0]], 4e-6);
}

#[test]
fn test_pec_truncated() {
    common::init_logger();
    assert!(matches!(
        load(&fixtures(), "pec96#h_trunc#h0", OutputMode::Labeled),
        Err(AdasError::TruncatedBlock(_))
    ));
}
