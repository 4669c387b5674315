use super::*;

#[test]
fn parses_hex_rgb_and_rgba() {
    assert_eq!(Rgba8::parse_hex("#1a1a2e").unwrap(), Rgba8::MIDNIGHT);
    assert_eq!(
        Rgba8::parse_hex("FF000080").unwrap(),
        Rgba8 {
            r: 255,
            g: 0,
            b: 0,
            a: 128
        }
    );
    assert!(Rgba8::parse_hex("#abc").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
}

#[test]
fn hex_round_trips_through_serde() {
    let c: Rgba8 = serde_json::from_str("\"#ffffff\"").unwrap();
    assert_eq!(c, Rgba8::WHITE);
    assert_eq!(serde_json::to_string(&Rgba8::MIDNIGHT).unwrap(), "\"#1a1a2e\"");
}

#[test]
fn canvas_scaling_checks_bounds() {
    let c = Canvas::MEME.scaled(2).unwrap();
    assert_eq!((c.width, c.height), (1000, 1000));
    assert!(Canvas::MEME.scaled(0).is_err());
    assert!(Canvas::MEME.scaled(1000).is_err());
    assert!(Canvas::new(0, 10).is_err());
}
