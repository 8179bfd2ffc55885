use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6fa; color: #1f2333; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
main.container { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 10px; padding: 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 4px rgba(0,0,0,.06); }
.btn { background: #524ed2; color: #fff; border: none; border-radius: 6px; padding: .6rem 1.2rem; cursor: pointer; text-decoration: none; }
.btn.secondary { background: #6b7280; }
.btn:disabled { opacity: .6; cursor: default; }
.input-group { margin-bottom: .9rem; display: flex; flex-direction: column; gap: .3rem; }
.progress-bar { background: #e5e7eb; border-radius: 6px; height: 1.4rem; overflow: hidden; }
.progress-fill { background: #10b981; height: 100%; color: #fff; text-align: center; font-size: .85rem; }
.stats { display: flex; gap: 1rem; margin: 1rem 0; }
.stat-card { flex: 1; background: #f9fafb; padding: .8rem; border-radius: 8px; text-align: center; }
.property-list { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 1rem; }
.property-card.preferred { border: 2px solid #f59e0b; }
.source-badge { font-size: .75rem; padding: .15rem .5rem; border-radius: 4px; background: #e0e7ff; }
.preferred-tag { font-size: .75rem; color: #b45309; margin-left: .5rem; }
.price { font-size: 1.3rem; font-weight: 600; margin: .5rem 0; }
.details-grid { display: grid; grid-template-columns: 1fr 1fr; gap: .4rem; font-size: .9rem; }
.detail-label { display: block; color: #6b7280; font-size: .75rem; }
table { width: 100%; border-collapse: collapse; }
td, th { text-align: left; padding: .4rem; border-bottom: 1px solid #e5e7eb; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Property Finder" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h3 { "Bangalore Property Finder" }
                    nav {
                        ul {
                            li { a href="/" { "Search" } }
                            li { a href="/results" { "Results" } }
                            li { a href="/runs" { "Run history" } }
                        }
                    }
                }
                (content)
            }
        }
    }
}
