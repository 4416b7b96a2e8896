use graphql_json::{DecodeErrorKind, Map, Value, graphql_record};

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Hero {
        name: String,
        friends: Vec<Friend>,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Friend {
        name: String,
    }
}

#[test]
fn object_with_nested_array() {
    let hero: Hero =
        graphql_json::from_str(r#"{"name": "Ann", "friends": [{"name": "Bo"}, {"name": "Cy"}]}"#)
            .unwrap();
    assert_eq!(
        hero,
        Hero {
            name: "Ann".to_owned(),
            friends: vec![
                Friend {
                    name: "Bo".to_owned()
                },
                Friend {
                    name: "Cy".to_owned()
                },
            ],
        }
    );
}

#[test]
fn redecoding_replaces_sequence_contents() {
    let mut hero = Hero::default();
    graphql_json::from_str_into(r#"{"friends": [{"name": "Bo"}, {"name": "Cy"}]}"#, &mut hero)
        .unwrap();
    assert_eq!(hero.friends.len(), 2);
    graphql_json::from_str_into(r#"{"friends": [{"name": "Di"}]}"#, &mut hero).unwrap();
    assert_eq!(
        hero.friends,
        vec![Friend {
            name: "Di".to_owned()
        }]
    );
}

// ----------------------------------------------------------------------------
// Fragments
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Animal {
        name: String,
        "... on Dog" on_dog: DogFragment,
        "... on Cat" on_cat: CatFragment,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct DogFragment {
        bark: bool,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct CatFragment {
        meows: bool,
    }
}

#[test]
fn fragment_keys_resolve_in_fragment_targets() {
    let animal: Animal = graphql_json::from_str(r#"{"name": "Rex", "bark": true}"#).unwrap();
    assert_eq!(animal.name, "Rex");
    assert!(animal.on_dog.bark);
    // The cat fragment saw nothing and stays zeroed.
    assert!(!animal.on_cat.meows);
}

#[test]
fn disjoint_fragments_split_one_object() {
    let animal: Animal = graphql_json::from_str(r#"{"bark": true, "meows": true}"#).unwrap();
    assert!(animal.on_dog.bark);
    assert!(animal.on_cat.meows);
    assert_eq!(animal.name, "");
}

#[test]
fn fragment_field_names_never_act_as_keys() {
    let err = graphql_json::from_str::<Animal>(r#"{"on_dog": {"bark": true}}"#).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::UnknownField { .. }));
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Overlapping {
        name: String,
        "... on Named" on_named: NamedFragment,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct NamedFragment {
        name: String,
        rank: u32,
    }
}

#[test]
fn one_value_lands_in_every_matching_branch() {
    let o: Overlapping = graphql_json::from_str(r#"{"name": "Zed", "rank": 3}"#).unwrap();
    assert_eq!(o.name, "Zed");
    assert_eq!(o.on_named.name, "Zed");
    assert_eq!(o.on_named.rank, 3);
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Outer {
        "... on A" on_a: MidFragment,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct MidFragment {
        "... on B" on_b: InnerFragment,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct InnerFragment {
        depth: u32,
    }
}

#[test]
fn fragments_nest_transitively() {
    let outer: Outer = graphql_json::from_str(r#"{"depth": 2}"#).unwrap();
    assert_eq!(outer.on_a.on_b.depth, 2);
}

#[test]
fn fragments_inside_array_elements() {
    graphql_record! {
        #[derive(Default, Debug, PartialEq)]
        struct Zoo {
            animals: Vec<Animal>,
        }
    }
    let zoo: Zoo = graphql_json::from_str(
        r#"{"animals": [{"name": "Rex", "bark": true}, {"name": "Tom", "meows": true}]}"#,
    )
    .unwrap();
    assert_eq!(zoo.animals.len(), 2);
    assert!(zoo.animals[0].on_dog.bark);
    assert!(!zoo.animals[0].on_cat.meows);
    assert!(zoo.animals[1].on_cat.meows);
}

// ----------------------------------------------------------------------------
// Embedded (flattened) records
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Issue {
        title: String,
        flatten common: CommonFields,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct CommonFields {
        id: u64,
        flatten audit: AuditFields,
    }
}

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct AuditFields {
        "createdAt" created_at: String,
    }
}

#[test]
fn embedded_records_flatten_transitively() {
    let issue: Issue = graphql_json::from_str(
        r#"{"title": "broken", "id": 41, "createdAt": "2018-02-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(issue.title, "broken");
    assert_eq!(issue.common.id, 41);
    assert_eq!(issue.common.audit.created_at, "2018-02-01T00:00:00Z");
}

// ----------------------------------------------------------------------------
// Tags: aliases and arguments
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct Profile {
        "smallPic: profilePicture(size: 50)" small_pic: String,
        "hero(episode: JEDI)" hero: String,
    }
}

#[test]
fn tag_aliases_and_arguments() {
    let profile: Profile =
        graphql_json::from_str(r#"{"smallPic": "s.png", "hero": "Luke"}"#).unwrap();
    assert_eq!(profile.small_pic, "s.png");
    assert_eq!(profile.hero, "Luke");
}

#[test]
fn tagged_names_are_case_sensitive() {
    graphql_record! {
        #[derive(Default, Debug)]
        struct Tagged {
            "name" name: String,
        }
    }
    let err = graphql_json::from_str::<Tagged>(r#"{"Name": "x"}"#).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::UnknownField { .. }));
}

#[test]
fn untagged_names_match_case_insensitively() {
    graphql_record! {
        #[derive(Default, Debug)]
        struct Untagged {
            created_at: String,
        }
    }
    let u: Untagged = graphql_json::from_str(r#"{"Created_At": "now"}"#).unwrap();
    assert_eq!(u.created_at, "now");
}

// ----------------------------------------------------------------------------
// Optionals and null
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct WithOptional {
        note: Option<String>,
        profile: Option<Friend>,
        count: u32,
    }
}

#[test]
fn null_clears_optionals_and_zeroes_scalars() {
    let w: WithOptional =
        graphql_json::from_str(r#"{"note": null, "profile": null, "count": null}"#).unwrap();
    assert_eq!(w.note, None);
    assert_eq!(w.profile, None);
    assert_eq!(w.count, 0);
}

#[test]
fn values_fill_optionals() {
    let w: WithOptional =
        graphql_json::from_str(r#"{"note": "hi", "profile": {"name": "Bo"}}"#).unwrap();
    assert_eq!(w.note.as_deref(), Some("hi"));
    assert_eq!(
        w.profile,
        Some(Friend {
            name: "Bo".to_owned()
        })
    );
}

#[test]
fn later_null_overrides_earlier_value() {
    let mut w = WithOptional::default();
    graphql_json::from_str_into(r#"{"note": "hi"}"#, &mut w).unwrap();
    assert!(w.note.is_some());
    graphql_json::from_str_into(r#"{"note": null}"#, &mut w).unwrap();
    assert_eq!(w.note, None);
}

#[test]
fn root_may_be_any_value() {
    assert!(graphql_json::from_str::<bool>("true").unwrap());
    assert_eq!(graphql_json::from_str::<u32>(" 42 ").unwrap(), 42);
    assert_eq!(graphql_json::from_str::<Option<u32>>("null").unwrap(), None);
    assert_eq!(
        graphql_json::from_str::<Vec<i64>>("[-1, 2]").unwrap(),
        vec![-1, 2]
    );
}

// ----------------------------------------------------------------------------
// Generic capture through map fields
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq)]
    struct WithMeta {
        id: u64,
        meta: Map,
    }
}

#[test]
fn map_fields_capture_subtrees_verbatim() {
    let w: WithMeta = graphql_json::from_str(
        r#"{"id": 1, "meta": {"tags": ["a", "b"], "big": 184467440737095516160, "none": null}}"#,
    )
    .unwrap();
    assert_eq!(w.id, 1);
    assert_eq!(
        w.meta.get("tags"),
        Some(&Value::Array(vec![
            Value::String("a".to_owned()),
            Value::String("b".to_owned()),
        ]))
    );
    // Number text survives untouched, beyond u64 range or not.
    assert_eq!(
        w.meta.get("big").and_then(Value::as_number).map(|n| n.as_text()),
        Some("184467440737095516160")
    );
    assert_eq!(w.meta.get("none"), Some(&Value::Null));
}

#[test]
fn null_map_decodes_as_empty() {
    let w: WithMeta = graphql_json::from_str(r#"{"meta": null, "id": 2}"#).unwrap();
    assert!(w.meta.is_empty());
    assert_eq!(w.id, 2);
}

// ----------------------------------------------------------------------------
// Errors
// ----------------------------------------------------------------------------

#[test]
fn unknown_keys_are_errors_with_suggestions() {
    let err = graphql_json::from_str::<Hero>(r#"{"nmae": "Ann"}"#).unwrap_err();
    match err.kind {
        DecodeErrorKind::UnknownField {
            field,
            expected,
            suggestion,
        } => {
            assert_eq!(field, "nmae");
            assert!(expected.contains(&"name"));
            assert_eq!(suggestion, Some("name"));
        }
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn trailing_data_is_an_error() {
    let err = graphql_json::from_str::<Hero>(r#"{"name": "Ann"} true"#).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::TrailingData { .. }));

    let err = graphql_json::from_str::<bool>("true false").unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::TrailingData { .. }));
}

#[test]
fn array_without_sequence_target() {
    let err = graphql_json::from_str::<Hero>(r#"{"name": ["Ann"]}"#).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::NoSequenceTarget { .. }));
}

#[test]
fn type_mismatches_are_reported() {
    graphql_record! {
        #[derive(Default, Debug)]
        struct Typed {
            count: u32,
        }
    }
    let err = graphql_json::from_str::<Typed>(r#"{"count": "three"}"#).unwrap_err();
    assert!(matches!(
        err.kind,
        DecodeErrorKind::TypeMismatch {
            expected: "u32",
            got: "string",
        }
    ));

    let err = graphql_json::from_str::<Typed>(r#"{"count": 1.5}"#).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::TypeMismatch { .. }));
}

#[test]
fn out_of_range_numbers_are_reported() {
    graphql_record! {
        #[derive(Default, Debug)]
        struct Small {
            byte: u8,
        }
    }
    let err = graphql_json::from_str::<Small>(r#"{"byte": 300}"#).unwrap_err();
    assert!(matches!(
        err.kind,
        DecodeErrorKind::NumberOutOfRange {
            target_type: "u8",
            ..
        }
    ));
    assert!(err.span.is_some());
}

#[test]
fn malformed_json_is_rejected() {
    assert!(matches!(
        graphql_json::from_str::<Hero>(r#"{"name" "Ann"}"#)
            .unwrap_err()
            .kind,
        DecodeErrorKind::UnexpectedToken { expected: "':'", .. }
    ));
    assert!(matches!(
        graphql_json::from_str::<Hero>(r#"{"name": tru}"#).unwrap_err().kind,
        DecodeErrorKind::Scan(_)
    ));
    assert!(matches!(
        graphql_json::from_str::<Hero>(r#"{"name":"#).unwrap_err().kind,
        DecodeErrorKind::UnexpectedEof { .. }
    ));
    assert!(matches!(
        graphql_json::from_str::<Hero>("").unwrap_err().kind,
        DecodeErrorKind::UnexpectedEof { .. }
    ));
}

// ----------------------------------------------------------------------------
// Strings
// ----------------------------------------------------------------------------

#[test]
fn string_escapes_are_decoded() {
    let hero: Hero =
        graphql_json::from_str(r#"{"name": "café 😀\n\"quoted\""}"#).unwrap();
    assert_eq!(hero.name, "café \u{1F600}\n\"quoted\"");
}

#[test]
fn escaped_keys_still_resolve() {
    // The escape decodes to 'n': keys are unescaped before field matching.
    let hero: Hero = graphql_json::from_str(r#"{"\u006eame": "Ann"}"#).unwrap();
    assert_eq!(hero.name, "Ann");
}

// ----------------------------------------------------------------------------
// Agreement with plain JSON decoding on fragment-free shapes
// ----------------------------------------------------------------------------

graphql_record! {
    #[derive(Default, Debug, PartialEq, serde::Deserialize)]
    struct PlainShape {
        name: String,
        age: u32,
        scores: Vec<f64>,
        nickname: Option<String>,
    }
}

#[test]
fn matches_serde_json_on_plain_shapes() {
    let inputs = [
        r#"{"name": "Ann", "age": 30, "scores": [1.5, -2.0], "nickname": "A"}"#,
        r#"{"name": "", "age": 0, "scores": [], "nickname": null}"#,
        r#"{"scores": [1e3], "name": "x", "age": 4294967295, "nickname": "y"}"#,
    ];
    for input in inputs {
        let ours: PlainShape = graphql_json::from_str(input).unwrap();
        let reference: PlainShape = serde_json::from_str(input).unwrap();
        assert_eq!(ours, reference, "disagreement on {input}");
    }
}
