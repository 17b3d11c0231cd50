use super::*;
use crate::error::PatternError;
use crate::values::RouteValue;

#[test]
fn test_parse_is_idempotent() {
    let template = "{controller=Home}/{action=Index}/{id:int?}";
    assert_eq!(parse(template).unwrap(), parse(template).unwrap());
}

#[test]
fn test_leading_slash_and_tilde_are_trimmed() {
    assert_eq!(parse("/a/{b}").unwrap().segments().len(), 2);
    assert_eq!(parse("~/a/{b}").unwrap().segments().len(), 2);
    assert!(matches!(parse("~a"), Err(PatternError::InvalidTilde { .. })));
}

#[test]
fn test_root_template_has_no_segments() {
    assert!(parse("").unwrap().segments().is_empty());
    assert!(parse("/").unwrap().segments().is_empty());
}

#[test]
fn test_simple_and_complex_segments() {
    let pattern = parse("api/{lang}-{region}/items").unwrap();
    let segments = pattern.segments();
    assert!(segments[0].is_simple());
    assert_eq!(segments[0].single_literal(), Some("api"));
    assert!(!segments[1].is_simple());
    assert_eq!(segments[1].parts().len(), 3);
    assert_eq!(pattern.parameters().len(), 2);
}

#[test]
fn test_inline_defaults_populate_defaults_map() {
    let pattern = parse("{controller=Home}/{action=Index}").unwrap();
    assert_eq!(pattern.defaults().get_str("controller"), Some("Home"));
    assert_eq!(pattern.get_parameter("ACTION").unwrap().default(), Some(&RouteValue::from("Index")));
}

#[test]
fn test_mismatched_braces() {
    assert!(matches!(parse("a/{b"), Err(PatternError::MismatchedBrace { .. })));
    assert!(matches!(parse("a/b}"), Err(PatternError::MismatchedBrace { .. })));
    assert!(matches!(parse("a/{b{c}"), Err(PatternError::MismatchedBrace { .. })));
}

#[test]
fn test_duplicate_parameter_names_are_case_insensitive() {
    assert!(matches!(
        parse("{id}/{ID}"),
        Err(PatternError::DuplicateParameter { .. })
    ));
}

#[test]
fn test_catch_all_must_be_last_and_alone() {
    assert!(parse("files/{*path}").is_ok());
    assert!(matches!(
        parse("{*path}/x"),
        Err(PatternError::CatchAllMisplaced { .. })
    ));
    assert!(matches!(
        parse("x/a{*path}"),
        Err(PatternError::CatchAllMisplaced { .. })
    ));
}

#[test]
fn test_invalid_names_and_literals() {
    assert!(matches!(parse("{}"), Err(PatternError::InvalidParameterName { .. })));
    assert!(matches!(parse("{a/b}"), Err(PatternError::InvalidParameterName { .. })));
    assert!(matches!(parse("a?b"), Err(PatternError::InvalidLiteral { .. })));
}

#[test]
fn test_segment_shape_errors() {
    assert!(matches!(parse("a//b"), Err(PatternError::EmptySegment { .. })));
    assert!(matches!(
        parse("{a}{b}"),
        Err(PatternError::ConsecutiveParameters { .. })
    ));
    assert!(matches!(
        parse("{a?}.{b}"),
        Err(PatternError::OptionalNotLast { .. })
    ));
    assert!(matches!(
        parse("{a}-{b?}"),
        Err(PatternError::OptionalNotPrecededByPeriod { .. })
    ));
    assert!(matches!(
        parse("{a}.{b?}.{c?}"),
        Err(PatternError::OptionalNotLast { .. })
    ));
}

#[test]
fn test_period_before_trailing_optional_becomes_separator() {
    let pattern = parse("moo/{p1}.{p2?}").unwrap();
    let parts = pattern.segments()[1].parts();
    assert_eq!(parts[1], Part::Separator(".".to_string()));

    let plain = parse("moo/{p1}.{p2}").unwrap();
    assert_eq!(plain.segments()[1].parts()[1], Part::Literal(".".to_string()));
}

#[test]
fn test_out_of_line_merge() {
    let pattern = RoutePatternBuilder::new("{controller}/{action}")
        .default_value("action", "Index")
        .default_value("area", "Admin")
        .constraint("controller", "alpha")
        .build()
        .unwrap();
    assert_eq!(pattern.get_parameter("action").unwrap().default(), Some(&RouteValue::from("Index")));
    assert_eq!(pattern.defaults().get_str("area"), Some("Admin"));
    assert_eq!(pattern.get_parameter("controller").unwrap().policies().len(), 1);
}

#[test]
fn test_out_of_line_default_conflicts() {
    assert!(matches!(
        RoutePatternBuilder::new("{id=1}").default_value("id", "2").build(),
        Err(PatternError::DefaultSpecifiedTwice { .. })
    ));
    assert!(matches!(
        RoutePatternBuilder::new("{id?}").default_value("id", "2").build(),
        Err(PatternError::OptionalWithDefault { .. })
    ));
}

#[test]
fn test_required_values_must_name_parameter_or_equal_default() {
    assert!(RoutePatternBuilder::new("{action}")
        .default_value("controller", "Home")
        .required_value("controller", "home")
        .required_value("action", "Index")
        .build()
        .is_ok());
    assert!(matches!(
        RoutePatternBuilder::new("{action}")
            .required_value("area", "Admin")
            .build(),
        Err(PatternError::InvalidRequiredValue { .. })
    ));
}

#[test]
fn test_precedence_orders_literals_first() {
    let literal = parse("products/all").unwrap();
    let constrained = parse("products/{id:int}").unwrap();
    let parameter = parse("products/{id}").unwrap();
    let catch_all = parse("products/{*rest}").unwrap();
    let complex = parse("products/{a}.{b}").unwrap();

    assert!(literal.precedence() < complex.precedence());
    assert!(complex.precedence() < constrained.precedence());
    assert!(constrained.precedence() < parameter.precedence());
    assert!(parameter.precedence() < catch_all.precedence());
    assert_eq!(parameter.precedence().to_string(), "0.14");
}

#[test]
fn test_escaped_braces_in_regex_constraint() {
    let pattern = parse(r"{code:regex(^\d{{3}}$)}").unwrap();
    let p = pattern.get_parameter("code").unwrap();
    assert_eq!(p.policies()[0].content(), Some(r"regex(^\d{3}$)"));
}

#[test]
fn test_catch_all_index() {
    assert_eq!(parse("a/{*rest}").unwrap().catch_all_index(), Some(1));
    assert_eq!(parse("a/{rest}").unwrap().catch_all_index(), None);
}
