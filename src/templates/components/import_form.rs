use maud::{html, Markup, PreEscaped};

const IMPORT_SCRIPT: &str = r#"
function importCsv(form) {
    const data = new FormData(form);
    fetch('/import_csv', { method: 'POST', body: data })
    .then(r => r.json())
    .then(res => {
        if (res.error) {
            document.getElementById('importResult').textContent = res.error;
        } else {
            window.location.href = '/results';
        }
    });
    return false;
}
"#;

/// Upload form for a previously exported CSV. Lands on `/results` when done.
pub fn import_form() -> Markup {
    html! {
        section class="card" id="importCard" {
            form onsubmit="return importCsv(this)" {
                label for="file" { "Load a previously exported CSV " }
                input type="file" id="file" name="file" accept=".csv" required;
                " "
                button class="btn secondary" type="submit" { "Import" }
            }
            p id="importResult" {}
        }
        script { (PreEscaped(IMPORT_SCRIPT)) }
    }
}
