use colored::Colorize;

pub fn show() {
    println!("{}", "ZapNutri".green().bold());
    println!("Nutrição e treino com acompanhamento profissional.");
    println!();
    println!("  • Registre refeições e acompanhe calorias e macros do dia");
    println!("  • Siga programas de treino montados para você");
    println!("  • Acompanhe peso, medidas e metas ao longo do tempo");
    println!("  • Nutricionistas e personal trainers acompanham seus alunos");
    println!();
    println!("Comece com {} ou {}.", "zapnutri register".cyan(), "zapnutri login".cyan());
}
