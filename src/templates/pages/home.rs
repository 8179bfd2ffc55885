// templates/pages/home.rs

use crate::domain::criteria::{DEFAULT_BUDGET_LAKHS, DEFAULT_PAGES};
use crate::domain::Source;
use crate::templates::{desktop_layout, import_form};
use maud::{html, Markup, PreEscaped};

const SCRIPT: &str = r#"
let statusTimer = null;

function byId(id) { return document.getElementById(id); }

function updateBudgetDisplay(val) {
    byId('budgetValue').textContent = '₹' + val + ' L';
}

function selectedSites() {
    const sites = {};
    document.querySelectorAll('input[name="site"]').forEach(cb => { sites[cb.value] = cb.checked; });
    return sites;
}

function resetStart() {
    byId('startBtn').disabled = false;
    byId('startBtn').textContent = 'Start Property Search';
    byId('stopBtn').style.display = 'none';
}

function startScraping() {
    byId('startBtn').disabled = true;
    byId('startBtn').textContent = 'Scraping in progress...';
    byId('viewResultsBtn').style.display = 'none';
    byId('statusPanel').style.display = 'block';

    fetch('/start_scraping', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
            pages: parseInt(byId('pages').value),
            bhk: byId('bhk').value.split(','),
            budget: parseInt(byId('budget').value),
            rera: byId('rera').value,
            preferred: byId('preferred').value === 'true',
            sites: selectedSites()
        })
    })
    .then(r => r.json())
    .then(data => {
        if (data.error) {
            byId('statusMessage').textContent = data.error;
            resetStart();
            return;
        }
        byId('stopBtn').style.display = 'inline-block';
        statusTimer = setInterval(updateStatus, 1000);
    })
    .catch(err => {
        byId('statusMessage').textContent = 'Error starting search: ' + err;
        resetStart();
    });
}

function stopScraping() {
    fetch('/stop_scraping', { method: 'POST' });
}

function updateStatus() {
    fetch('/status')
    .then(r => r.json())
    .then(data => {
        byId('statusMessage').textContent = data.message;
        byId('propertiesFound').textContent = data.properties_found;
        byId('currentSite').textContent = data.current_site || '-';
        byId('progressBar').style.width = data.progress + '%';
        byId('progressBar').textContent = data.progress + '%';

        if (!data.running) {
            clearInterval(statusTimer);
            resetStart();
            if (data.results && data.results.length > 0) {
                byId('viewResultsBtn').style.display = 'inline-block';
            }
        }
    });
}
"#;

pub fn home_page() -> Markup {
    desktop_layout(
        "Search",
        html! {
            main class="container" {
                h1 { "Find your Bangalore home" }
                p { "Searches 99acres, MagicBricks and Housing.com, then ranks preferred builders first." }

                section class="card" {
                    div class="input-group" {
                        label for="pages" { "Pages to scrape per website" }
                        input type="number" id="pages" value=(DEFAULT_PAGES) min="1" max="10";
                    }
                    div class="input-group" {
                        label for="bhk" { "Property type" }
                        select id="bhk" {
                            option value="2,3" selected { "2 BHK & 3 BHK" }
                            option value="2" { "2 BHK only" }
                            option value="3" { "3 BHK only" }
                        }
                    }
                    div class="input-group" {
                        label for="budget" { "Max budget (lakhs)" }
                        div {
                            input type="range" id="budget" min="10" max="200" value=(DEFAULT_BUDGET_LAKHS)
                                oninput="updateBudgetDisplay(this.value)";
                            " "
                            span id="budgetValue" { "₹" (DEFAULT_BUDGET_LAKHS) " L" }
                        }
                    }
                    div class="input-group" {
                        label for="rera" { "RERA verified" }
                        select id="rera" {
                            option value="Yes" selected { "Yes (verified only)" }
                            option value="No" { "No / any" }
                        }
                    }
                    div class="input-group" {
                        label for="preferred" { "Preferred builders only" }
                        select id="preferred" {
                            option value="false" selected { "No (show all)" }
                            option value="true" { "Yes (Prestige, Sobha, etc.)" }
                        }
                    }
                    div class="input-group" {
                        span { "Sites" }
                        @for source in Source::ALL {
                            label {
                                input type="checkbox" name="site" value=(source.key()) checked;
                                " " (source.label())
                            }
                        }
                    }

                    button class="btn" id="startBtn" onclick="startScraping()" { "Start Property Search" }
                    " "
                    button class="btn secondary" id="stopBtn" style="display: none;" onclick="stopScraping()" { "Stop" }
                }

                section class="card" id="statusPanel" style="display: none;" {
                    div class="progress-bar" {
                        div class="progress-fill" id="progressBar" style="width: 0%" { "0%" }
                    }
                    p id="statusMessage" { "Initializing..." }
                    div class="stats" {
                        div class="stat-card" {
                            strong id="propertiesFound" { "0" }
                            div { "Properties found" }
                        }
                        div class="stat-card" {
                            strong id="currentSite" { "-" }
                            div { "Current source" }
                        }
                    }
                    a class="btn" id="viewResultsBtn" href="/results" style="display: none;" { "View Results" }
                }

                (import_form())
            }
            script { (PreEscaped(SCRIPT)) }
        },
    )
}
