use crate::{
    embed::{Embed, ResidueNumbering, Selection},
    error::EmbedError,
    modifier::ReprType,
    secondary_structure::structure_modifiers,
};

/// Default structure scene.
///
/// Starts from `entries`, adds helix and sheet entries derived from the
/// secondary structure labels if given and finally shows the whole
/// structure as ribbon unless some ribbon entry is already present.
pub fn structure_display<K, S>(
    atom_data: impl Into<String>,
    secondary_structure: Option<(&str, &ResidueNumbering)>,
    entries: impl IntoIterator<Item = (K, S)>,
) -> Result<Embed, EmbedError>
where
    K: AsRef<str>,
    S: Into<Selection>,
{
    let mut embed = Embed::with_entries(atom_data, entries)?;

    if let Some((labels, numbering)) = secondary_structure {
        embed.apply(&structure_modifiers(labels, numbering)?)?;
    }

    let ribbon = ReprType::Ribbon.keyword();
    if embed.repr_entries().get(ribbon).is_none() {
        embed.add_repr_entry(ribbon, "all")?;
    }
    Ok(embed)
}
