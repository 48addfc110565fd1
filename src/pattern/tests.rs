#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::{ErrorKind, RouteError, SyntaxViolation};
use regex::Regex;

#[test]
fn test_validate_accepts_plain_and_wildcard_paths() {
    assert!(validate("/").is_ok());
    assert!(validate("/users").is_ok());
    assert!(validate("/user/{id}/{slug?}").is_ok());
    assert!(validate("/files/{_name}-{ext}").is_ok());
}

#[test]
fn test_validate_double_slash() {
    let err = validate("/a//b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPathSyntax);
    assert_eq!(
        err,
        RouteError::InvalidPathSyntax {
            uri: "/a//b".into(),
            violations: vec![SyntaxViolation::ExtraSlashes],
        }
    );
}

#[test]
fn test_validate_backslash() {
    let err = validate("/a\\b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPathSyntax);
}

#[test]
fn test_validate_collects_every_violation() {
    let err = validate("a//b\\ {{c}}").unwrap_err();
    match err {
        RouteError::InvalidPathSyntax { violations, .. } => {
            assert_eq!(
                violations,
                vec![
                    SyntaxViolation::MissingLeadingSlash,
                    SyntaxViolation::ExtraSlashes,
                    SyntaxViolation::Backslash,
                    SyntaxViolation::DoubleBraces,
                    SyntaxViolation::Whitespace,
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validate_reserved_positional_form() {
    let err = validate("/a/{id}/{0}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReservedWildcardForm);
    assert_eq!(err.uri(), Some("/a/{id}/{0}"));
    assert_eq!(validate("/a/{12}").unwrap_err().kind(), ErrorKind::ReservedWildcardForm);
}

#[test]
fn test_validate_unbalanced_braces() {
    for bad in ["/a/{id", "/a/id}", "/a/{i{d}}x", "/a/{1abc}", "/a/{}", "/a/{id-x}"] {
        let err = validate(bad).unwrap_err();
        assert!(
            matches!(
                err.kind(),
                ErrorKind::UnbalancedBraces | ErrorKind::InvalidPathSyntax
            ),
            "{bad} -> {err:?}"
        );
    }
    assert_eq!(
        validate("/a/{i{d}").unwrap_err(),
        RouteError::UnbalancedBraces {
            uri: "/a/{i{d}".into(),
            open: 2,
            close: 1,
            matches: 1,
        }
    );
}

#[test]
fn test_extract_positional_form() {
    let data = extract("/user/{id}/{slug?}").unwrap();
    assert_eq!(data.positional_form, "/user/{0}/{1}");
    assert_eq!(data.names, vec!["id", "slug"]);
    assert_eq!(data.optional, vec![false, true]);
    assert_eq!(data.optional_indices(), vec![1]);
}

#[test]
fn test_extract_without_wildcards() {
    let data = extract("/about/team").unwrap();
    assert_eq!(data.positional_form, "/about/team");
    assert!(data.is_empty());
}

#[test]
fn test_extract_duplicate_name() {
    let err = extract("/a/{id}/{id}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateWildcardName);
    // Optional and mandatory spellings share one canonical name.
    let err = extract("/a/{id}/{id?}").unwrap_err();
    assert_eq!(
        err,
        RouteError::DuplicateWildcardName {
            uri: "/a/{id}/{id?}".into(),
            name: "id".into(),
        }
    );
}

#[test]
fn test_extract_positional_form_is_fixed_point() {
    let first = extract("/shop/{category}-{item?}/{page?}").unwrap();
    let again = extract(&first.positional_form).unwrap();
    assert!(again.is_empty());
    assert_eq!(again.positional_form, first.positional_form);
}

#[test]
fn test_power_set_size_and_order() {
    assert_eq!(power_set(0).len(), 1);
    let sets = power_set(3);
    assert_eq!(sets.len(), 8);
    assert!(sets[0].iter().all(|present| *present));
    assert!(sets[7].iter().all(|present| !*present));
}

#[test]
fn test_expand_without_optionals() {
    let variants = expand("/user/{0}/{1}", &[false, false]);
    assert_eq!(
        variants,
        vec![Variant {
            pattern: "/user/{0}/{1}".into(),
            indices: vec![0, 1],
        }]
    );
}

#[test]
fn test_expand_optional_trailing_segment() {
    let variants = expand("/post/{0}/{1}", &[false, true]);
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].pattern, "/post/{0}/{1}");
    assert_eq!(variants[0].indices, vec![0, 1]);
    assert_eq!(variants[1].pattern, "/post/{0}");
    assert_eq!(variants[1].indices, vec![0]);
}

#[test]
fn test_expand_every_combination() {
    let data = extract("/{a?}/x/{b}/{c?}").unwrap();
    let variants = expand(&data.positional_form, &data.optional);
    assert_eq!(variants.len(), 4);
    assert_eq!(variants[0].pattern, data.positional_form);
    let patterns: Vec<&str> = variants.iter().map(|v| v.pattern.as_str()).collect();
    assert_eq!(
        patterns,
        vec!["/{0}/x/{1}/{2}", "/x/{1}/{2}", "/{0}/x/{1}", "/x/{1}"]
    );
    assert_eq!(variants[2].indices, vec![0, 1]);
    assert_eq!(variants[3].indices, vec![1]);
}

#[test]
fn test_expand_adjacent_optionals_down_to_root() {
    let variants = expand("/{0}/{1}", &[true, true]);
    let patterns: Vec<&str> = variants.iter().map(|v| v.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["/{0}/{1}", "/{1}", "/{0}", "/"]);
    assert_eq!(variants[3].indices, Vec::<usize>::new());

    let variants = expand("/a/{0}", &[true]);
    assert_eq!(variants[1].pattern, "/a");
    assert!(variants[1].indices.is_empty());
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("/a//b/"), "/a/b");
    assert_eq!(normalize("//"), "/");
    assert_eq!(normalize(""), "/");
    assert_eq!(normalize("/post/{0}/"), "/post/{0}");
}

#[test]
fn test_constraint_binding_errors() {
    let builder = RouteBuilder::new("/post/{year}/{slug?}").unwrap();
    let err = builder.clone().constraint("month", "[0-9]+").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownWildcardName);

    let err = builder
        .clone()
        .constraint("year", "[0-9]{4}")
        .unwrap()
        .constraint("year", "[0-9]+")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateConstraint);

    let err = builder.constraint("year", "[0-9").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRegex);
}

#[test]
fn test_compile_regex_defaults_and_escapes() {
    let route = RouteBuilder::new("/feed.{format}")
        .unwrap()
        .constraint("format", "xml|json")
        .unwrap()
        .finalize();
    assert_eq!(route.variants()[0].regex, r"^/feed\.(xml|json)$");

    let route = RoutePattern::parse("/user/{id}").unwrap();
    assert_eq!(
        route.variants()[0].regex,
        format!("^/user/({DEFAULT_CONSTRAINT})$")
    );
    assert_eq!(route.constraint("id"), Some(DEFAULT_CONSTRAINT));
}

#[test]
fn test_capture_slots_account_for_inner_groups() {
    let fragments = vec!["(en|fr)".to_string(), "[0-9]+".to_string()];
    assert_eq!(capture_slots(&[0, 1], &fragments), vec![1, 3]);
    assert_eq!(capture_slots(&[1], &fragments), vec![1]);
}

#[test]
fn test_every_variant_matches_its_own_instantiation() {
    let route = RouteBuilder::new("/post/{year}/{slug?}")
        .unwrap()
        .constraint("year", "[0-9]{4}")
        .unwrap()
        .finalize();
    for variant in route.variants() {
        let re = Regex::new(&variant.regex).unwrap();
        let mut path = variant.pattern.clone();
        for index in &variant.indices {
            let value = if *index == 0 { "2024" } else { "hello-world" };
            path = path.replace(&format!("{{{index}}}"), value);
        }
        assert!(re.is_match(&path), "{} !~ {}", path, variant.regex);
    }
}

#[test]
fn test_builder_head_derived_from_get() {
    let route = RouteBuilder::new("/ping")
        .unwrap()
        .method(HttpMethod::Get, "PingController")
        .unwrap()
        .finalize();
    let head = route.methods().get(&HttpMethod::Head).unwrap();
    assert_eq!(head.handler, "PingController");
    assert!(head.derived);

    let route = RouteBuilder::new("/ping")
        .unwrap()
        .method(HttpMethod::Get, "PingController")
        .unwrap()
        .method(HttpMethod::Head, "HeadController")
        .unwrap()
        .finalize();
    assert_eq!(route.handler(HttpMethod::Head), Some("HeadController"));
    assert!(!route.methods()[&HttpMethod::Head].derived);
}

#[test]
fn test_builder_method_and_name_errors() {
    let err = RouteBuilder::new("/x")
        .unwrap()
        .method_str("FETCH", "X")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMethod);

    let err = RouteBuilder::new("/x")
        .unwrap()
        .method(HttpMethod::Post, "A")
        .unwrap()
        .method_str("POST", "B")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateMethod);

    let err = RouteBuilder::new("/x").unwrap().name("bad name!").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRouteName);
    assert!(RouteBuilder::new("/x").unwrap().name("api.v1-users_list").is_ok());
}

#[test]
fn test_builder_caps_optional_wildcards() {
    let optional_path = |k: usize| -> String { (0..k).map(|i| format!("/{{w{i}?}}")).collect() };

    let route = RouteBuilder::new(optional_path(MAX_OPTIONAL_WILDCARDS))
        .unwrap()
        .finalize();
    assert_eq!(route.variants().len(), 1 << MAX_OPTIONAL_WILDCARDS);

    // Past the cap, and far past a 64-bit shift, the builder refuses the pattern.
    for k in [MAX_OPTIONAL_WILDCARDS + 1, 64] {
        let uri = optional_path(k);
        let err = RouteBuilder::new(uri.as_str()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyOptionalWildcards);
        assert_eq!(
            err,
            RouteError::TooManyOptionalWildcards {
                uri,
                count: k,
                max: MAX_OPTIONAL_WILDCARDS,
            }
        );
    }

    // Mandatory wildcards do not count toward the cap.
    let mut uri = optional_path(MAX_OPTIONAL_WILDCARDS);
    uri.push_str("/{id}");
    assert!(RouteBuilder::new(uri).is_ok());
}

#[test]
fn test_route_kind_and_metadata() {
    let route = RouteBuilder::new("/docs")
        .unwrap()
        .middleware("auth")
        .provenance("routes/web.rs:12")
        .finalize();
    assert_eq!(route.kind(), RouteKind::Static);
    assert!(!route.has_wildcards());
    assert_eq!(route.middlewares(), ["auth".to_string()]);
    assert_eq!(route.provenance(), Some("routes/web.rs:12"));

    let route = RoutePattern::parse("/docs/{page?}").unwrap();
    assert_eq!(route.kind(), RouteKind::Dynamic);
    assert_eq!(route.optional_flags(), [true]);
    assert_eq!(route.positional_form(), "/docs/{0}");
}

#[test]
fn test_http_method_parse() {
    assert_eq!("PROPFIND".parse::<HttpMethod>(), Ok(HttpMethod::Propfind));
    assert!("get".parse::<HttpMethod>().is_err());
    assert_eq!(HttpMethod::try_from(&http::Method::PATCH), Ok(HttpMethod::Patch));
}
