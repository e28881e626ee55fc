//! Build complete classes and read them back

use tego_bytecode::class_file::attr;
use tego_bytecode::{access, decode_code, verify_class, ClassBuilder, ClassFile, JvmClass, Opcode};
use tego_jvm::{known, JvmClassSignature, JvmMethodSignature, JvmObject, JvmType, JvmTypeParam};

/// A singleton class with a private constructor, a static instance and an accessor
fn singleton(version: u16) -> Vec<u8> {
    let name = "org/example/OnlyOne";
    let this_type = JvmType::Object(JvmObject::new(name));
    let mut class =
        ClassBuilder::new(version, access::PUBLIC | access::FINAL | access::SUPER, name, "java/lang/Object")
            .unwrap();
    class
        .add_field(access::PRIVATE | access::STATIC | access::FINAL, "instance", &this_type)
        .unwrap();

    let void = JvmMethodSignature::new(JvmType::Void, vec![]);
    let mut init = class.method(access::PRIVATE, "<init>", &void, &[]).unwrap();
    init.load_this();
    init.invokespecial("java/lang/Object", "<init>", "()V").unwrap();
    init.return_value(&JvmType::Void);
    init.finish().unwrap();

    let mut clinit = class.method(access::STATIC, "<clinit>", &void, &[]).unwrap();
    clinit.new_object(name).unwrap();
    clinit.dup();
    clinit.invokespecial(name, "<init>", "()V").unwrap();
    clinit.putstatic(name, "instance", &this_type).unwrap();
    clinit.return_value(&JvmType::Void);
    clinit.finish().unwrap();

    let accessor = JvmMethodSignature::new(this_type.clone(), vec![]);
    let mut get = class
        .method(access::PUBLIC | access::STATIC | access::FINAL, "getInstance", &accessor, &[])
        .unwrap();
    get.getstatic(name, "instance", &this_type).unwrap();
    get.return_value(&this_type);
    get.finish().unwrap();

    class.build()
}

#[test]
fn test_singleton_class_round_trip() {
    let bytes = singleton(52);
    let class = verify_class(&bytes).unwrap();

    assert_eq!(class.major_version, 52);
    assert_eq!(class.this_class_name(), Some("org/example/OnlyOne"));
    assert_eq!(class.super_class_name(), Some("java/lang/Object"));
    assert!(class.find_field("instance").is_some());

    let get = class
        .find_method("getInstance", Some("()Lorg/example/OnlyOne;"))
        .unwrap();
    assert_eq!(get.access_flags, access::PUBLIC | access::STATIC | access::FINAL);

    let clinit = class.find_method("<clinit>", Some("()V")).unwrap();
    let code = class.code_of(clinit).unwrap().unwrap();
    let ops: Vec<Opcode> = decode_code(&code.code).unwrap().iter().map(|i| i.opcode).collect();
    assert_eq!(
        ops,
        vec![Opcode::New, Opcode::Dup, Opcode::Invokespecial, Opcode::Putstatic, Opcode::Return]
    );
    assert_eq!(code.max_stack, 2);
    assert_eq!(code.max_locals, 0);
}

#[test]
fn test_class_bytes_are_stable() {
    assert_eq!(singleton(52), singleton(52));
    let reparsed = ClassFile::parse(&singleton(52)).unwrap();
    assert_eq!(reparsed.to_bytes(), singleton(52));
}

#[test]
fn test_generic_class_signature() {
    let name = "org/example/Box";
    let mut class = ClassBuilder::new(52, access::PUBLIC | access::SUPER, name, "java/lang/Object").unwrap();
    class.add_interface("java/lang/Comparable").unwrap();
    let sig = JvmClassSignature::new(
        known::object(),
        vec![JvmType::Object(JvmObject::generic(
            "java/lang/Comparable",
            vec![JvmType::type_var("T")],
        ))],
        vec![JvmTypeParam::bounded("T", Some(known::object()), vec![])],
    );
    class.set_signature(&sig.signature()).unwrap();
    let bytes = class.build();

    let parsed = verify_class(&bytes).unwrap();
    assert_eq!(parsed.interface_names(), vec!["java/lang/Comparable"]);
    assert_eq!(
        parsed.signature_in(&parsed.attributes),
        Some("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Comparable<TT;>;")
    );
}

#[test]
fn test_jvm_class_check_and_listing() {
    let ty = JvmType::Object(JvmObject::new("org/example/OnlyOne"));
    let class = JvmClass::from_type(&ty, singleton(52)).unwrap();
    class.check().unwrap();

    let listing = class.to_string();
    assert!(listing.starts_with("class org/example/OnlyOne extends java/lang/Object"));
    assert!(listing.contains("method getInstance()Lorg/example/OnlyOne;"));
    assert!(listing.contains("getstatic #"));
    assert!(listing.contains("local this Lorg/example/OnlyOne; slot 0"));
}

#[test]
fn test_truncated_class_fails_verification() {
    let bytes = singleton(52);
    let class = JvmClass {
        class_name: "OnlyOne".to_string(),
        package_name: "org/example".to_string(),
        bytes: bytes[..bytes.len() - 3].to_vec(),
    };
    assert!(class.check().is_err());
    assert!(class.to_string().contains("undecodable"));
}

#[test]
fn test_stack_map_table_only_for_new_versions() {
    for (version, expected) in [(49u16, false), (50, true), (52, true)] {
        let name = "T";
        let mut class = ClassBuilder::new(version, access::PUBLIC, name, "java/lang/Object").unwrap();
        let sig = JvmMethodSignature::new(known::object(), vec![known::object()]);
        let mut m = class.method(access::STATIC, "f", &sig, &["x"]).unwrap();
        let x = m.parameter(0).unwrap();
        let done = m.new_label();
        m.load(x);
        m.ifnonnull(done);
        m.aconst_null();
        m.athrow();
        m.bind(done);
        m.load(x);
        m.return_value(&known::object());
        m.finish().unwrap();

        let file = verify_class(&class.build()).unwrap();
        let code = file.code_of(&file.methods[0]).unwrap().unwrap();
        assert_eq!(
            file.find_attribute(&code.attributes, attr::STACK_MAP_TABLE).is_some(),
            expected,
            "version {}",
            version
        );
    }
}
