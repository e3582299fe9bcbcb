use tessera_blocks::{BlockRegistry, RenderKind};

#[test]
fn loads_table_from_toml() {
    let src = r#"
        [[blocks]]
        name = "air"
        id = 0
        opaque = false
        render = "none"

        [[blocks]]
        name = "basalt"
        id = 1

        [[blocks]]
        name = "brine"
        id = 2
        opaque = false
        liquid = true
        light_decay = 3

        [[blocks]]
        name = "lamp"
        id = 3
        emission = 12
    "#;
    let reg = BlockRegistry::from_toml_str(src).expect("valid table");
    let brine = reg.id_by_name("brine").unwrap();
    assert!(reg.is_opaque(reg.id_by_name("basalt").unwrap()));
    assert!(reg.is_liquid(brine));
    assert_eq!(reg.render_kind(brine), RenderKind::Liquid);
    assert_eq!(reg.light_decay(brine), 3);
    assert_eq!(reg.emission(3), 12);
    assert_eq!(reg.render_kind(0), RenderKind::None);
}

#[test]
fn rejects_duplicate_ids() {
    let src = r#"
        [[blocks]]
        name = "air"
        id = 0
        opaque = false

        [[blocks]]
        name = "a"
        id = 4

        [[blocks]]
        name = "b"
        id = 4
    "#;
    let err = BlockRegistry::from_toml_str(src).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn rejects_missing_or_opaque_air() {
    let no_air = r#"
        [[blocks]]
        name = "stone"
        id = 1
    "#;
    assert!(BlockRegistry::from_toml_str(no_air).is_err());

    let opaque_air = r#"
        [[blocks]]
        name = "air"
        id = 0
    "#;
    assert!(BlockRegistry::from_toml_str(opaque_air).is_err());
}

#[test]
fn rejects_zero_decay_and_overbright_emission() {
    let zero_decay = r#"
        [[blocks]]
        name = "air"
        id = 0
        opaque = false
        light_decay = 0
    "#;
    assert!(BlockRegistry::from_toml_str(zero_decay).is_err());

    let bright = r#"
        [[blocks]]
        name = "air"
        id = 0
        opaque = false

        [[blocks]]
        name = "sun"
        id = 9
        emission = 20
    "#;
    assert!(BlockRegistry::from_toml_str(bright).is_err());
}
