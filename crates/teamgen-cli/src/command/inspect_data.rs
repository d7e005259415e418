use std::path::PathBuf;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectDataArg {
    /// Game data file (JSON)
    #[arg(long)]
    data: PathBuf,
}

pub(crate) fn run(arg: &InspectDataArg) -> anyhow::Result<()> {
    let data = util::read_game_data(&arg.data)?;

    eprintln!("Game data: {}", arg.data.display());
    eprintln!("  Movesets:       {}", data.movesets().len());
    eprintln!("  Core positions: {}", data.core_len());
    for position in 0..data.core_len() {
        eprintln!(
            "    #{position}: {} candidates",
            data.core_pool(position).len()
        );
    }
    eprintln!("  Norms:          {}", data.norms().len());
    for norm in data.norms() {
        eprintln!(
            "    {} ({:.0}): {} members",
            norm.name(),
            norm.rating(),
            norm.members().len()
        );
    }
    let megas = data.movesets().iter().filter(|m| m.is_mega()).count();
    let banned = data.movesets().iter().filter(|m| data.is_banned(m)).count();
    eprintln!("  Mega movesets:  {megas}");
    eprintln!("  Banned:         {banned}");

    Ok(())
}
