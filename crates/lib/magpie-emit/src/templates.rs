use std::fmt::Write;

use anyhow::bail;

use crate::context::{FileContext, ProjectContext, TypeContext};
use crate::engine::{template, TemplateEngine};

/// The built-in template set.
///
/// Renders the generated C++ surface the runtime reflection system consumes:
/// registrar functions issuing `Registrar`/`Type` calls, serialization shim
/// bodies, the whole-project identifier enumeration and the registration
/// sequence. Rendering is purely a function of the context, so identical
/// registries yield byte-identical artifacts.
#[derive(Debug, Default)]
pub struct BuiltinTemplates;

impl TemplateEngine for BuiltinTemplates {
    fn render(&self, name: &str, context: &serde_json::Value) -> anyhow::Result<String> {
        match name {
            template::TYPE_REGISTRATION => {
                render_registration(serde_json::from_value(context.clone())?)
            }
            template::TYPE_SERIALIZATION => {
                render_serialization(serde_json::from_value(context.clone())?)
            }
            template::ALL_TYPES => render_all_types(serde_json::from_value(context.clone())?),
            template::REGISTRATION_SEQUENCE => {
                render_sequence(serde_json::from_value(context.clone())?)
            }
            unknown => bail!("Unknown template: {}", unknown),
        }
    }
}

fn render_registration(ctx: FileContext) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by metagen from {}. Do not edit.", ctx.header)?;
    writeln!(out, "#include \"{}\"", ctx.header)?;
    writeln!(out, "#include \"Reflection/reflection.h\"")?;
    for include in &ctx.reflection_includes {
        writeln!(out, "#include \"{}\"", include)?;
    }
    writeln!(out)?;
    writeln!(out, "using namespace Engine::Reflection;")?;

    for ty in &ctx.types {
        writeln!(out)?;
        writeln!(out, "void Register_{}() {{", ty.mangled_name)?;
        writeln!(
            out,
            "    Registrar::RegisterNewType(\"{}\", std::type_index(typeid({})), true);",
            ty.qualified_name, ty.qualified_name
        )?;
        writeln!(
            out,
            "    auto type = std::const_pointer_cast<Type>(GetType(\"{}\"));",
            ty.qualified_name
        )?;
        for base in &ty.base_types {
            writeln!(out, "    type->AddBaseType(GetType<{}>());", base)?;
        }
        for ctor in &ty.constructors {
            let args = ctor.arg_types.join(", ");
            writeln!(
                out,
                "    type->AddConstructor<{}>(MakeConstructor<{}{}{}>());",
                args,
                ty.qualified_name,
                if args.is_empty() { "" } else { ", " },
                args
            )?;
        }
        for field in &ty.fields {
            match field.shape.as_str() {
                "scalar" => writeln!(
                    out,
                    "    type->AddField(GetType<{}>(), \"{}\", MakeFieldGetter(&{}::{}));",
                    field.type_name, field.name, ty.qualified_name, field.name
                )?,
                _ => {
                    let element = field.element.as_deref().unwrap_or("void");
                    writeln!(
                        out,
                        "    type->AddArrayField(GetType<{}>(), \"{}\", MakeArrayGetter(&{}::{}), MakeArraySize(&{}::{}), MakeArrayResize(&{}::{}));",
                        element,
                        field.name,
                        ty.qualified_name,
                        field.name,
                        ty.qualified_name,
                        field.name,
                        ty.qualified_name,
                        field.name
                    )?
                }
            }
        }
        for method in &ty.methods {
            writeln!(
                out,
                "    type->AddMethod(\"{}\", MakeMethod(&{}::{}), GetType<{}>(), {}, {});",
                method.name,
                ty.qualified_name,
                method.name,
                method.return_type,
                method.is_const,
                method.returns_reference
            )?;
        }
        for element in &ty.reflected_pointer_elements {
            writeln!(
                out,
                "    PointerType::RegisterSmartPointerGetFunc<{}>();",
                element
            )?;
        }
        writeln!(out, "}}")?;
    }

    for en in &ctx.enums {
        let values = en
            .values
            .iter()
            .map(|value| format!("\"{}\"", value))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out)?;
        writeln!(out, "void Register_{}() {{", en.mangled_name)?;
        writeln!(
            out,
            "    Registrar::RegisterNewEnum(\"{}\", {{{}}});",
            en.qualified_name, values
        )?;
        writeln!(out, "}}")?;
    }

    Ok(out)
}

fn render_serialization(ctx: FileContext) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by metagen from {}. Do not edit.", ctx.header)?;
    writeln!(out, "#include \"{}\"", ctx.header)?;
    writeln!(out, "#include \"Reflection/serialization.h\"")?;
    for include in &ctx.serialization_includes {
        writeln!(out, "#include \"{}\"", include)?;
    }

    for ty in ctx.types.iter().filter(|ty| !ty.custom_serialization) {
        writeln!(out)?;
        writeln!(
            out,
            "void {}::_SERIALIZATION_SAVE_(Engine::Serialization::Archive &buffer) const {{",
            ty.qualified_name
        )?;
        for base in &ty.base_types {
            writeln!(out, "    {}::_SERIALIZATION_SAVE_(buffer);", base)?;
        }
        for field in &ty.serialized_fields {
            writeln!(out, "    buffer << {};", field.name)?;
        }
        writeln!(out, "}}")?;

        writeln!(out)?;
        writeln!(
            out,
            "void {}::_SERIALIZATION_LOAD_(Engine::Serialization::Archive &buffer) {{",
            ty.qualified_name
        )?;
        for base in &ty.base_types {
            writeln!(out, "    {}::_SERIALIZATION_LOAD_(buffer);", base)?;
        }
        for field in &ty.serialized_fields {
            writeln!(out, "    buffer >> {};", field.name)?;
        }
        writeln!(out, "}}")?;

        // backdoor constructor used by the deserializer
        writeln!(out)?;
        writeln!(
            out,
            "{}::{}(Engine::Serialization::SerializationMarker) {{}}",
            ty.qualified_name,
            unqualified(ty)
        )?;
    }

    Ok(out)
}

fn unqualified(ty: &TypeContext) -> &str {
    ty.qualified_name
        .rsplit("::")
        .next()
        .unwrap_or(&ty.qualified_name)
}

fn render_all_types(ctx: ProjectContext) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by metagen. Do not edit.")?;
    writeln!(out, "#pragma once")?;
    writeln!(out)?;
    writeln!(out, "// Mangled identifier of every reflected entity.")?;
    write!(out, "#define MAGPIE_ALL_REFLECTED_TYPES(_)")?;
    for name in &ctx.mangled_names {
        write!(out, " \\\n    _({})", name)?;
    }
    writeln!(out)?;
    Ok(out)
}

fn render_sequence(ctx: ProjectContext) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by metagen. Do not edit.")?;
    writeln!(out)?;
    for registrar in &ctx.ordered_registrars {
        writeln!(out, "void {}();", registrar)?;
    }
    writeln!(out)?;
    writeln!(out, "// base types register strictly before their derivatives")?;
    writeln!(out, "void RegisterAllReflectedTypes() {{")?;
    for registrar in &ctx.ordered_registrars {
        writeln!(out, "    {}();", registrar)?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}
