use std::io::{self, Write};

use {
    anyhow::Result,
    nibe_config::NibeConfig,
    nibe_uplink::{SystemTree, SystemsPage},
};

use crate::session::uplink_client;

/// List the systems assigned to the authorized user.
pub async fn systems(config: &NibeConfig) -> Result<()> {
    let mut client = uplink_client(config)?;
    let page = client.systems().await?;
    render_systems(&page, &mut io::stdout().lock())
}

/// Print every parameter of every category of every unit of every system.
pub async fn parameters(config: &NibeConfig, json: bool) -> Result<()> {
    let mut client = uplink_client(config)?;
    let tree = client.parameter_tree().await?;
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &tree)?;
        writeln!(out)?;
        return Ok(());
    }
    render_tree(&tree, &mut out)
}

fn render_systems(page: &SystemsPage, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "Total of {} system(s) returned by the API query",
        page.num_items
    )?;
    for system in &page.objects {
        writeln!(out, "System Id:   {}", system.system_id)?;
        writeln!(out, "System Name: {}", system.name)?;
    }
    Ok(())
}

fn render_tree(tree: &[SystemTree], out: &mut impl Write) -> Result<()> {
    for system in tree {
        writeln!(out, "System Id:  {}", system.system.system_id)?;
        for unit in &system.units {
            writeln!(out, "\tUnit Id:   {}", unit.unit.system_unit_id)?;
            for category in &unit.categories {
                writeln!(out, "\t\tCategory Id:   {}", category.category.category_id)?;
                for p in &category.parameters {
                    writeln!(out, "\t\t\tParameter Id:              {}", p.parameter_id)?;
                    writeln!(out, "\t\t\t\tParameter Name:          {}", or_none(&p.name))?;
                    writeln!(out, "\t\t\t\tParameter Title:         {}", or_none(&p.title))?;
                    writeln!(
                        out,
                        "\t\t\t\tParameter Designation:   {}",
                        or_none(&p.designation)
                    )?;
                    writeln!(out, "\t\t\t\tParameter Unit:          {}", or_none(&p.unit))?;
                    writeln!(
                        out,
                        "\t\t\t\tParameter Display Value: {}",
                        or_none(&p.display_value)
                    )?;
                    match p.raw_value {
                        Some(raw) => writeln!(out, "\t\t\t\tParameter Raw Value:     {raw}")?,
                        None => writeln!(out, "\t\t\t\tParameter Raw Value:     None")?,
                    }
                }
            }
        }
    }
    Ok(())
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}
