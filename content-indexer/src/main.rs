use std::fs;
use std::path::Path;
use clap::{Arg, ArgAction, Command};
use walkdir::WalkDir;

use content_filter::builder::FilterBuilder;
use utils_common::RecordMetadata;

// 主函数
fn main() {
    // 设置命令行参数
    let matches = Command::new("内容索引生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("从 CMS 导出的 JSON 记录生成筛选索引")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("记录源目录路径（JSON 文件）")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("索引输出目录路径")
            .required(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    // 获取参数值
    let source_dir = matches.get_one::<String>("source").unwrap();
    let output_dir = matches.get_one::<String>("output").unwrap();
    let verbose = matches.get_flag("verbose");

    // 检查目录
    let source_path = Path::new(source_dir);
    if !source_path.exists() || !source_path.is_dir() {
        eprintln!("错误: 源目录不存在或不是有效目录 '{}'", source_dir);
        std::process::exit(1);
    }

    // 创建输出目录
    let output_path = Path::new(output_dir);
    if !output_path.exists() {
        if let Err(e) = fs::create_dir_all(output_path) {
            eprintln!("错误: 无法创建输出目录 '{}': {}", output_dir, e);
            std::process::exit(1);
        }
    }

    println!("开始生成索引...");
    println!("源目录: {}", source_dir);
    println!("输出目录: {}", output_dir);

    // 生成索引
    match generate_index(source_dir, output_dir, verbose) {
        Ok(_) => println!("索引生成成功！"),
        Err(e) => {
            eprintln!("错误: 索引生成失败: {}", e);
            std::process::exit(1);
        }
    }
}

// 生成索引的主函数
fn generate_index(source_dir: &str, output_dir: &str, verbose: bool) -> Result<(), String> {
    // 记录开始时间
    let start_time = std::time::Instant::now();

    // 扫描JSON文件
    println!("扫描JSON记录文件...");
    let (records, skipped_count) = scan_json_files(source_dir, verbose)?;

    let record_count = records.len();
    println!(
        "扫描完成。找到 {} 条有效记录，跳过 {} 个文件。",
        record_count, skipped_count
    );

    if record_count == 0 {
        return Err("没有找到有效记录".to_string());
    }

    // 创建筛选索引构建器
    let mut filter_builder = FilterBuilder::new();

    // 添加记录到构建器
    for record in records {
        filter_builder.add_record(record);
    }

    // 构建输出路径
    let filter_index_path = format!("{}/filter_index.bin", output_dir);

    // 保存索引
    println!("正在生成和保存索引...");
    filter_builder.save_filter_index(&filter_index_path)?;

    // 计算耗时
    let elapsed = start_time.elapsed();
    println!("索引生成完成！耗时: {:.2}秒", elapsed.as_secs_f32());

    Ok(())
}

// 扫描JSON文件并提取记录数据
fn scan_json_files(dir_path: &str, verbose: bool) -> Result<(Vec<RecordMetadata>, usize), String> {
    let mut records = Vec::new();
    let mut skipped = 0;

    // 递归遍历目录
    for entry in WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| format!("遍历目录时出错: {}", e))?;
        let path = entry.path();

        // 只处理JSON文件
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("警告: 无法读取文件 '{}': {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        match parse_records_json(&content) {
            Ok(mut parsed) => {
                if verbose {
                    println!("已解析 '{}': {} 条记录", path.display(), parsed.len());
                }
                records.append(&mut parsed);
            }
            Err(e) => {
                eprintln!("警告: 跳过无法解析的文件 '{}': {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

// 解析一个JSON文件的内容：既接受记录数组，也接受单条记录对象
fn parse_records_json(content: &str) -> Result<Vec<RecordMetadata>, String> {
    if let Ok(list) = serde_json::from_str::<Vec<RecordMetadata>>(content) {
        return Ok(list);
    }

    serde_json::from_str::<RecordMetadata>(content)
        .map(|record| vec![record])
        .map_err(|e| format!("JSON 解析失败: {}", e))
}
