use crate::{bundle::ViewerLibrary, embed::Embed};
use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("can't encode javascript string")]
    Json(#[from] serde_json::Error),
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// DOM id of an embedded viewer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbedId(String);

impl EmbedId {
    /// Fresh id `glmol_<n>`, unique within the process
    pub fn generate() -> Self {
        Self(format!("glmol_{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn fixed(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EmbedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Script and library url handed to a rich display host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPayload {
    pub script: String,
    pub lib: String,
}

fn textarea(id: &EmbedId, suffix: &str, content: &str) -> String {
    format!(
        "\n<textarea  wrap='off' id='{id}_{suffix}' style='display:none;'>\n{content}\n</textarea>\n        "
    )
}

fn data_js(id: &EmbedId, embed: &Embed) -> Result<String, RenderError> {
    let pdb_json = serde_json::to_string(&textarea(id, "src", embed.atom_data()))?;
    let repr_json = serde_json::to_string(&textarea(id, "rep", &embed.repr_string()))?;
    Ok(format!(
        r#"
        var pdb_textarea_json = {pdb_json};
        element.append(pdb_textarea_json);

        var repr_textarea_json = {repr_json};
        element.append(repr_textarea_json);
    "#
    ))
}

fn display_js(id: &EmbedId) -> String {
    format!(
        r#"
        element.append('<div id="{id}" style="width: auto; height:8in"></div>');

        console.log("Created elements.");
        container.show();

        var {id} = new GLmol('{id}', true);

        console.log("Loaded GLmol as id: {id}.");

        function parseAndDefineRepresentation()
          {{
              var all = this.getAllAtoms(),
                  hetatm = this.getHetatms(all).filter(this.isNotSolvent);

              this.colorByChain(all, true);
              this.colorByAtom(this.atoms.filter(this.propertyIsnt("elem", "C")), {{}});

              this.parseRep(this.modelGroup, $('#{id}_rep').val());

              this.drawAtomsAsSphere(this.modelGroup, hetatm, this.sphereRadius);
          }}

        {id}.rebuildScene = function (repressDraw)
          {{
              var time = new Date();

              this.initializeScene();
              this.defineRepresentation();

              console.log("Built scene in " + (new Date() - time) + "ms");

              if (repressDraw)
              {{
                return;
              }}
              else
              {{
                this.show();
              }}
          }};

        {id}.defineRepresentation = parseAndDefineRepresentation;
        {id}.loadMolecule(true);

        $.data(element.children()[0], "glmol", {id})
        "#
    )
}

impl Embed {
    /// Script creating the hidden data textareas and the viewer bound to `id`.
    /// Expects `element` and `container` to be defined by the host page.
    pub fn javascript(&self, id: &EmbedId) -> Result<String, RenderError> {
        Ok(data_js(id, self)? + &display_js(id))
    }

    /// Rich display payload with a fresh id
    pub fn display_payload(&self, library_url: impl Into<String>) -> Result<DisplayPayload, RenderError> {
        Ok(DisplayPayload {
            script: self.javascript(&EmbedId::generate())?,
            lib: library_url.into(),
        })
    }

    /// Standalone html page with the library inlined
    pub fn dump_html(&self, lib: &ViewerLibrary) -> Result<String, RenderError> {
        let embed_js = self.javascript(&EmbedId::fixed("glmol"))?;
        Ok(format!(
            r##"
    <!doctype html>
    <title></title>
    <body>

    <script src="http://code.jquery.com/jquery-1.7.2.min.js" type="text/javascript"></script>
    <script>
    {lib}
    </script>

    <div id="element"></div>


    <script>
// Setup element and container the same way a notebook output cell does.
var element = $("#element")
var container = element

    {embed_js}
    </script>

    </body>
    "##
        ))
    }
}

//##############################
//#  Tests
//##############################

#[cfg(test)]
mod tests {
    use super::*;

    fn embed() -> Embed {
        Embed::with_entries(
            "ATOM      1  N   GLY A   2      35.259  38.537  16.817  1.00 30.55           N",
            [("ribbon", "all"), ("line", "all; heavy")],
        )
        .unwrap()
    }

    #[test]
    fn ids_are_unique() {
        let a = EmbedId::generate();
        let b = EmbedId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("glmol_"));
    }

    #[test]
    fn script_binds_id() {
        let id = EmbedId::fixed("glmol_test");
        let js = embed().javascript(&id).unwrap();
        assert!(js.contains("id='glmol_test_src'"));
        assert!(js.contains("id='glmol_test_rep'"));
        assert!(js.contains("var glmol_test = new GLmol('glmol_test', true);"));
        assert!(js.contains("$('#glmol_test_rep').val()"));
        // Representation is embedded as a json string literal
        assert!(js.contains(r"ribbon:all\nline:all; heavy"));
    }

    #[test]
    fn payload_uses_fresh_id() {
        let e = embed();
        let p1 = e.display_payload("static/glmol/GLmol.full.devel.js").unwrap();
        let p2 = e.display_payload("static/glmol/GLmol.full.devel.js").unwrap();
        assert_eq!(p1.lib, "static/glmol/GLmol.full.devel.js");
        assert_ne!(p1.script, p2.script);
    }

    #[test]
    fn html_page() {
        let html = embed().dump_html(&ViewerLibrary::wrap("var GLmol;")).unwrap();
        assert!(html.contains("jquery-1.7.2.min.js"));
        assert!(html.contains("window.GLmol = GLmol;"));
        assert!(html.contains("new GLmol('glmol', true)"));
        assert!(html.contains(r##"var element = $("#element")"##));
    }
}
