//! Validator tests.

use ride_relay::flow::validate::{
    is_valid_phone, is_valid_seat_count, is_valid_time, FlowRules, PhonePolicy,
};

#[test]
fn route_accepts_exactly_the_two_configured_routes() {
    let rules = FlowRules::default();
    assert!(rules.is_valid_route("Beshariq \u{27a1}\u{fe0f} Farg\u{02bb}ona"));
    assert!(rules.is_valid_route("Farg\u{02bb}ona \u{27a1}\u{fe0f} Beshariq"));

    assert!(!rules.is_valid_route("Beshariq"));
    assert!(!rules.is_valid_route("Beshariq \u{27a1}\u{fe0f} Farg\u{02bb}ona "));
    assert!(!rules.is_valid_route("beshariq \u{27a1}\u{fe0f} farg\u{02bb}ona"));
    assert!(!rules.is_valid_route(""));
}

#[test]
fn phone_rejects_empty_and_garbage() {
    for policy in [PhonePolicy::Uzbekistan, PhonePolicy::International] {
        assert!(!is_valid_phone("", policy));
        assert!(!is_valid_phone("   ", policy));
        assert!(!is_valid_phone("+998 90 123 45 67", policy));
        assert!(!is_valid_phone("phone", policy));
    }
}

#[test]
fn default_rules_use_uzbek_phone_policy() {
    let rules = FlowRules::default();
    assert_eq!(rules.phone_policy, PhonePolicy::Uzbekistan);
    assert!(rules.is_valid_phone("+998901234567"));
    assert!(!rules.is_valid_phone("+123456789"));
}

#[test]
fn seat_count_accepts_one_to_four_only() {
    for ok in ["1", "2", "3", "4"] {
        assert!(is_valid_seat_count(ok), "{ok} should be valid");
    }
    for bad in ["0", "5", "abc", "", " ", "2a", "1.5"] {
        assert!(!is_valid_seat_count(bad), "{bad:?} should be invalid");
    }
}

#[test]
fn yes_no_accepts_only_configured_tokens() {
    let rules = FlowRules::default();
    assert!(rules.is_valid_yes_no("Ha"));
    assert!(rules.is_valid_yes_no("Yo\u{2018}q"));
    assert_eq!(rules.parse_yes_no("Ha"), Some(true));
    assert_eq!(rules.parse_yes_no("Yo\u{2018}q"), Some(false));

    assert!(!rules.is_valid_yes_no("ha"));
    assert!(!rules.is_valid_yes_no("Yo'q"));
    assert!(!rules.is_valid_yes_no(""));
}

#[test]
fn time_accepts_full_day_range() {
    assert!(is_valid_time("00:00"));
    assert!(is_valid_time("09:30"));
    assert!(is_valid_time("23:59"));
}

#[test]
fn time_rejects_out_of_range_and_unpadded() {
    for bad in ["24:00", "12:60", "9:00", "", "14:00:00", "14-00", " 14:00"] {
        assert!(!is_valid_time(bad), "{bad:?} should be invalid");
    }
}
