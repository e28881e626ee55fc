//! Integration tests for descriptor and signature encoding

use tego_jvm::known;
use tego_jvm::parse::parse_partial;
use tego_jvm::{
    JvmClassSignature, JvmMethodSignature, JvmObject, JvmType, JvmTypeArg, JvmTypeParam,
    SignatureError, TypeError, Variance,
};

fn sample_types() -> Vec<JvmType> {
    let test_class = JvmObject::generic("org/example/TestClass", vec![JvmType::type_var("T")]);
    let n2 = JvmObject::nested(
        test_class.clone(),
        "N2",
        vec![JvmType::type_var("U1"), JvmType::type_var("U2")],
        true,
    );
    let nn2 = JvmObject::nested(
        n2,
        "NN2",
        vec![JvmType::type_var("V1"), JvmType::type_var("V2")],
        true,
    );
    let s = JvmObject::nested(
        JvmObject::new("org/example/TestClass"),
        "S",
        vec![JvmType::TypeArg(JvmTypeArg::invariant(known::string()))],
        false,
    );

    vec![
        JvmType::Boolean,
        JvmType::Long,
        JvmType::array_of(JvmType::array_of(JvmType::array_of(JvmType::Double))),
        JvmType::array_of(known::string()),
        known::object(),
        known::list(),
        JvmType::Object(nn2),
        JvmType::Object(s),
        JvmType::TypeArg(JvmTypeArg::covariant(known::object())),
        JvmType::TypeArg(JvmTypeArg::contravariant(known::string())),
        JvmType::type_var("CTX"),
    ]
}

#[test]
fn test_signature_round_trip() {
    for ty in sample_types() {
        let signature = ty.signature();
        let parsed = JvmType::from_signature(&signature).expect("signature should parse");
        assert_eq!(parsed.signature(), signature, "round trip of {}", signature);
    }
}

#[test]
fn test_descriptor_round_trip() {
    for ty in sample_types().into_iter().filter(|ty| !matches!(ty, JvmType::TypeArg(_))) {
        let descriptor = ty.descriptor().expect("type should have a descriptor");
        let parsed = JvmType::from_descriptor(&descriptor).expect("descriptor should parse");
        assert_eq!(parsed.descriptor().unwrap(), descriptor, "round trip of {}", descriptor);
    }
}

#[test]
fn test_type_arguments_have_no_descriptor() {
    for ty in sample_types().into_iter().filter(|ty| matches!(ty, JvmType::TypeArg(_))) {
        assert!(
            matches!(ty.descriptor(), Err(TypeError::NoSuchProperty { .. })),
            "{} should have no descriptor",
            ty
        );
    }
}

#[test]
fn test_descriptor_drops_generic_information() {
    let ty = JvmType::from_signature(
        "Lorg/example/TestClass<TT;>.N2<TU1;TU2;>.NN2<TV1;TV2;>;",
    )
    .unwrap();
    assert_eq!(ty.descriptor().unwrap(), "Lorg/example/TestClass.N2.NN2;");
    assert_eq!(ty.internal_name().unwrap(), "org/example/TestClass.N2.NN2");
    assert_eq!(ty.simple_name().unwrap(), "NN2");
    assert_eq!(
        ty.to_string(),
        "org.example.TestClass<T>.N2<U1,U2>.NN2<V1,V2>"
    );
}

#[test]
fn test_nested_generic_arguments() {
    let ty = JvmType::from_signature("Ljava/util/List<Ljava/util/List<Ljava/lang/String;>;>;")
        .unwrap();
    assert_eq!(ty.descriptor().unwrap(), "Ljava/util/List;");
    assert_eq!(
        ty.to_string(),
        "java.util.List<java.util.List<java.lang.String>>"
    );
    let arg = &ty.as_object().unwrap().type_args()[0];
    match arg {
        JvmType::TypeArg(arg) => {
            assert_eq!(arg.variance(), Variance::Invariant);
            assert_eq!(
                arg.element().unwrap().signature(),
                "Ljava/util/List<Ljava/lang/String;>;"
            );
        }
        other => panic!("expected a type argument, got {:?}", other),
    }
}

#[test]
fn test_wildcard_argument_is_erased_from_descriptor() {
    let ty = JvmType::from_signature("Ljava/lang/Class<*>;").unwrap();
    assert_eq!(ty.signature(), "Ljava/lang/Class<*>;");
    assert_eq!(ty.descriptor().unwrap(), "Ljava/lang/Class;");
    let arg = ty.as_object().unwrap().type_args()[0].clone();
    assert!(arg.descriptor().is_err());
}

#[test]
fn test_parse_sequence_of_types() {
    let text = "TCTX;ILjava/util/List<+Ljava/lang/Number;>;[J";
    let mut cursor = 0;
    let mut types = Vec::new();
    while cursor < text.len() {
        let (ty, next) = parse_partial(text, cursor, text.len(), false).unwrap();
        types.push(ty);
        cursor = next;
    }
    assert_eq!(types.len(), 4);
    assert_eq!(types[0], JvmType::type_var("CTX"));
    assert_eq!(types[1], JvmType::Int);
    assert_eq!(types[2].signature(), "Ljava/util/List<+Ljava/lang/Number;>;");
    assert_eq!(types[3], JvmType::array_of(JvmType::Long));
}

#[test]
fn test_rejects_bad_input() {
    assert_eq!(JvmType::from_signature(""), Err(SignatureError::Empty));
    assert!(matches!(
        JvmType::from_descriptor("Ljava/util/List<TE;>;"),
        Err(SignatureError::Malformed { .. })
    ));
    assert!(matches!(
        JvmType::from_signature("Ljava/lang/String;I"),
        Err(SignatureError::Incomplete { .. })
    ));
    assert!(matches!(
        JvmType::from_signature("Ljava/util/List<>;"),
        Err(SignatureError::Malformed { .. })
    ));
}

#[test]
fn test_strategy_class_signature() {
    let strategy = JvmType::Object(JvmObject::generic(
        "com/virtlink/tego/strategies/Strategy1",
        vec![
            JvmType::TypeArg(JvmTypeArg::invariant(JvmType::type_var("CTX"))),
            JvmType::TypeArg(JvmTypeArg::invariant(known::as_reference(&JvmType::Int))),
            JvmType::TypeArg(JvmTypeArg::invariant(known::object())),
            JvmType::TypeArg(JvmTypeArg::invariant(known::string())),
        ],
    ));
    let sig = JvmClassSignature::new(
        known::object(),
        vec![strategy],
        vec![JvmTypeParam::bounded("CTX", Some(known::object()), vec![])],
    );
    assert_eq!(
        sig.signature(),
        "<CTX:Ljava/lang/Object;>Ljava/lang/Object;\
         Lcom/virtlink/tego/strategies/Strategy1<TCTX;Ljava/lang/Integer;Ljava/lang/Object;Ljava/lang/String;>;"
    );
}

#[test]
fn test_method_signature_round_trip_through_descriptor() {
    let sig = JvmMethodSignature::new(
        known::string(),
        vec![JvmType::type_var("CTX"), JvmType::Int, known::object()],
    );
    assert_eq!(
        sig.signature(),
        "(TCTX;ILjava/lang/Object;)Ljava/lang/String;"
    );
    let descriptor = sig.descriptor().unwrap();
    let erased = JvmMethodSignature::from_descriptor(&descriptor).unwrap();
    assert_eq!(erased.descriptor().unwrap(), descriptor);
    assert_eq!(erased.parameter_slots(), 3);
}
