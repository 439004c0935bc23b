use glmol_embed::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

fn test_embed() -> anyhow::Result<Embed> {
    let atoms = read_pdb_file(fixture("test.pdb"))?;
    Ok(Embed::with_entries(
        atoms,
        [
            ("helix", "atom 53-82"),
            ("ribbon", "all"),
            ("line", "all; heavy"),
            ("bgcolor", "000000"),
        ],
    )?)
}

#[test]
fn pdb_fixture_is_filtered() -> anyhow::Result<()> {
    let embed = test_embed()?;
    let lines: Vec<_> = embed.atom_data().lines().collect();
    assert_eq!(lines.len(), 83);
    assert!(lines[0].starts_with("HELIX"));
    assert!(lines.iter().skip(1).all(|l| l.starts_with("ATOM")));
    Ok(())
}

#[test]
fn ribbon_then_helix() -> anyhow::Result<()> {
    let mut embed = Embed::new("");
    embed.apply(&(Modifier::ribbon(Selector::all())
        + Modifier::helix(Selector::residue_number_range(5, 10))))?;
    assert_eq!(embed.repr_string(), "ribbon:all\nhelix:residue_number 5-10");
    Ok(())
}

#[test]
fn clear_keeps_colors() -> anyhow::Result<()> {
    let mut embed = test_embed()?;
    embed
        .apply(&Modifier::stick(Selector::chain("A")?))?
        .apply(&Modifier::sphere(SubSelector::Carbon))?
        .apply(&Modifier::color("ff0000", Selector::residue_number(5)?))?
        .apply(&Modifier::clear())?;
    assert_eq!(
        embed.repr_string(),
        "helix:atom 53-82\nbgcolor:000000\ncolor:ff0000:residue_number 5"
    );
    Ok(())
}

#[test]
fn repr_string_round_trip() -> anyhow::Result<()> {
    let embed = test_embed()?.with_modifier(&Modifier::line(Selector::chain("B")?))?;
    let repr = embed.repr_string();

    let expected: usize = embed.repr_entries().iter().map(|(_, s)| s.len()).sum();
    assert_eq!(repr.lines().count(), expected);

    let reparsed = Embed::from_repr_script(embed.atom_data(), &repr)?;
    assert_eq!(reparsed.repr_string(), repr);
    assert_eq!(
        parse_script(&repr)?[0],
        ("helix".to_owned(), "atom 53-82".to_owned())
    );
    Ok(())
}

#[test]
fn values_cannot_add_entries() -> anyhow::Result<()> {
    let mut embed = test_embed()?;
    let before = embed.repr_string();

    assert!(matches!(
        Selector::chain("A\nstick:all"),
        Err(SelectorError::MalformedValue("chain", _))
    ));
    // Would render as a selector string with an extra sub-selector
    assert!(Selector::chain("A; heavy").is_err());
    assert!(embed.apply(&Modifier::background_color("000000\nsphere:all")).is_err());
    assert!(embed.add_repr_entry("line", "all\nstick:all").is_err());

    assert_eq!(embed.repr_string(), before);
    assert_eq!(embed.repr_string().lines().count(), embed.repr_entries().len());
    Ok(())
}

#[test]
fn subselector_composition_law() -> anyhow::Result<()> {
    let bases = [
        Selector::all(),
        Selector::chain("A")?,
        Selector::residue_number_range(2, 7),
        "chain A; bb".parse::<Selector>()?,
    ];
    for base in bases {
        for sub in [SubSelector::Carbon, SubSelector::Heavyatom, SubSelector::Backbone] {
            let before = base.selector_string();
            let composed = &base + sub;
            assert_eq!(composed.selector_string(), format!("{before}; {sub}"));
            assert_eq!(base.selector_string(), before);
        }
    }
    Ok(())
}

#[test]
fn composite_grouping() {
    let a = || Modifier::ribbon(Selector::all());
    let b = || Modifier::background_color("ffffff");
    let c = || Modifier::clear_repr(ReprType::Line);
    assert_eq!((a() + b()) + c(), a() + (b() + c()));
    assert_eq!(((a() + b()) + c()).children().len(), 3);
}

#[test]
fn spectrum_over_residues() -> anyhow::Result<()> {
    let scores = vec![3.0, -1.0, 0.5, 10.0, 2.0, f64::NAN];
    let prop = ResidueProperty::new(scores.clone())
        .with_numbering(ResidueNumbering::Explicit(vec![2, 3, 4, 5, 6, 7]))?;
    let mut embed = test_embed()?.with_residue_property("score", prop);
    let before = embed.repr_entries().len();
    embed.apply(&Modifier::from(
        ResidueSpectrum::new("score").with_sub_selector(SubSelector::Backbone),
    ))?;

    let colors = embed.repr_entries().get("color").unwrap_or_default();
    assert_eq!(colors.len(), scores.len());
    assert_eq!(embed.repr_entries().len(), before + 1);

    let ramp = ColorRamp::palette("viridis")?;
    let bounds = ramp.channel_bounds();
    for (entry, resid) in colors.iter().zip(2..) {
        let (hex, sel) = entry.split_once(':').unwrap();
        assert_eq!(sel, format!("residue {resid}; bb"));
        let rgb = parse_color(hex)?;
        for ch in 0..3 {
            let (lo, hi) = bounds[ch];
            assert!(rgb[ch] >= lo - 1.0 / 255.0 && rgb[ch] <= hi + 1.0 / 255.0);
        }
    }
    // NaN maps to the start of the gradient, so does the minimum
    assert_eq!(colors[5].split_once(':').unwrap().0, colors[1].split_once(':').unwrap().0);
    Ok(())
}

#[test]
fn missing_property_leaves_embed() -> anyhow::Result<()> {
    let mut embed = test_embed()?;
    let before = embed.repr_string();
    let m = Modifier::ribbon(Selector::chain("A")?) + Modifier::from(ResidueSpectrum::new("bfactor"));
    let err = embed.apply(&m).unwrap_err();
    assert!(matches!(err, EmbedError::MissingProperty { .. }));
    assert_eq!(embed.repr_string(), before);
    Ok(())
}

#[test]
fn secondary_structure_scene() -> anyhow::Result<()> {
    let embed = structure_display(
        read_pdb_file(fixture("test.pdb"))?,
        Some(("LLHHHHHHLEE", &ResidueNumbering::Sequential { first: 2 })),
        [("line", "all; heavy")],
    )?;
    assert_eq!(
        embed.repr_string(),
        "line:all; heavy\nhelix:residue_number 4-9\nsheet:residue_number 11-12\nribbon:all"
    );
    Ok(())
}

#[test]
fn scene_file() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("glmol_scene_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let res = scene_in(&dir);
    std::fs::remove_dir_all(&dir)?;
    res
}

fn scene_in(dir: &std::path::Path) -> anyhow::Result<()> {
    std::fs::copy(fixture("test.pdb"), dir.join("test.pdb"))?;
    let scene = dir.join("scene.toml");
    std::fs::write(
        &scene,
        r#"
pdb = "test.pdb"
repr = [["ribbon", "all"]]

[properties.score]
values = [1.0, 2.0]
first_residue = 2

[[modifiers]]
type = "stick"
selector = "residue_number 2-3; heavy"

[[modifiers]]
type = "spectrum"
property = "score"
colors = ["white", "red"]
"#,
    )?;

    let embed = SceneConfig::from_file(&scene)?.build_embed()?;
    assert_eq!(embed.atom_data().lines().count(), 83);
    assert_eq!(
        embed.repr_string(),
        "ribbon:all\nstick:residue_number 2-3; heavy\ncolor:#ffffff:residue 2\ncolor:#ff0000:residue 3"
    );

    let html = embed.dump_html(&ViewerLibrary::wrap("var GLmol = function () {};"))?;
    assert!(html.contains("glmol_rep"));
    Ok(())
}
